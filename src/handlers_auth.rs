use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use warp::{reject, Filter, Rejection, Reply};

use crate::config::Config;
use crate::image_types::Provider;
use crate::user_store::{SavedImage, UserRecord, UserStore};
use crate::warp_helpers::{
    with_config, with_users, Conflict, Forbidden, StoreFailure, Unauthorized, ValidationError,
};

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub username: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub username: String,
    pub auth_provider: String,
    pub created_at: DateTime<Utc>,
    pub saved: Vec<SavedImage>,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    #[serde(rename = "webformatURL")]
    pub webformat_url: String,
    #[serde(default)]
    pub tags: String,
    pub provider: Option<Provider>,
}

fn store_rejection(e: crate::user_store::StoreError) -> Rejection {
    log::error!("User store error: {}", e);
    reject::custom(StoreFailure {
        message: "User store unavailable".to_string(),
    })
}

fn bearer_token(header: Option<String>) -> Option<String> {
    let header = header?;
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Resolve the Authorization header to a user record, or reject with 401.
fn authenticate(
    header: Option<String>,
    users: &Arc<dyn UserStore>,
) -> Result<UserRecord, Rejection> {
    let token = bearer_token(header).ok_or_else(|| {
        reject::custom(Unauthorized {
            message: "Missing bearer token".to_string(),
        })
    })?;

    users
        .find_by_token(&token)
        .map_err(store_rejection)?
        .ok_or_else(|| {
            reject::custom(Unauthorized {
                message: "Invalid or expired token".to_string(),
            })
        })
}

pub async fn signup(
    body: CredentialsRequest,
    users: Arc<dyn UserStore>,
) -> Result<impl Reply, Rejection> {
    let username = body.username.trim();
    if username.is_empty() || body.password.is_empty() {
        return Err(reject::custom(ValidationError {
            message: "Username and password are required".to_string(),
        }));
    }

    if users.get(username).map_err(store_rejection)?.is_some() {
        return Err(reject::custom(Conflict {
            message: "Username is already taken".to_string(),
        }));
    }

    let mut record = UserRecord::local(username, &body.password);
    let token = record.rotate_token();
    users.upsert(record).map_err(store_rejection)?;

    log::info!("New signup: {}", username);
    Ok(warp::reply::with_status(
        warp::reply::json(&TokenResponse {
            username: username.to_string(),
            token,
        }),
        warp::http::StatusCode::CREATED,
    ))
}

pub async fn login(
    body: CredentialsRequest,
    users: Arc<dyn UserStore>,
) -> Result<impl Reply, Rejection> {
    let username = body.username.trim();
    let mut record = users
        .get(username)
        .map_err(store_rejection)?
        .filter(|u| u.verify_password(&body.password))
        .ok_or_else(|| {
            reject::custom(Unauthorized {
                message: "Invalid username or password".to_string(),
            })
        })?;

    // One active session per user: a fresh login invalidates the old token.
    let token = record.rotate_token();
    users.upsert(record).map_err(store_rejection)?;

    Ok(warp::reply::json(&TokenResponse {
        username: username.to_string(),
        token,
    }))
}

#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    sub: String,
    email: Option<String>,
    aud: Option<String>,
}

/// Verify the ID token against Google's tokeninfo endpoint and log the
/// verified identity in, creating the federated record on first sight.
pub async fn google_login(
    body: GoogleLoginRequest,
    users: Arc<dyn UserStore>,
    config: Arc<Config>,
    http: Arc<reqwest::Client>,
) -> Result<impl Reply, Rejection> {
    if body.id_token.trim().is_empty() {
        return Err(reject::custom(ValidationError {
            message: "id_token is required".to_string(),
        }));
    }

    let response = http
        .get(&config.google_tokeninfo_url)
        .query(&[("id_token", body.id_token.as_str())])
        .send()
        .await
        .map_err(|e| {
            log::error!("Google tokeninfo call failed: {}", e);
            reject::custom(Unauthorized {
                message: "Could not verify Google ID token".to_string(),
            })
        })?;

    if !response.status().is_success() {
        return Err(reject::custom(Unauthorized {
            message: "Invalid Google ID token".to_string(),
        }));
    }

    let info: GoogleTokenInfo = response.json().await.map_err(|e| {
        log::error!("Google tokeninfo parse failed: {}", e);
        reject::custom(Unauthorized {
            message: "Invalid Google ID token".to_string(),
        })
    })?;

    if let Some(expected) = &config.google_client_id {
        if info.aud.as_deref() != Some(expected.as_str()) {
            return Err(reject::custom(Unauthorized {
                message: "Google ID token was issued for a different client".to_string(),
            }));
        }
    }

    let username = info.email.unwrap_or_else(|| info.sub.clone());
    let existing = users.get(&username).map_err(store_rejection)?;
    // A password account keyed by the same name stays a password account;
    // a verified Google identity must not capture its token.
    if let Some(record) = &existing {
        if record.auth_provider == "local" {
            return Err(reject::custom(Conflict {
                message: "Username is already registered with a password".to_string(),
            }));
        }
    }

    let mut record = existing.unwrap_or_else(|| UserRecord::federated(&username, &info.sub));
    record.google_id = Some(info.sub);
    let token = record.rotate_token();
    users.upsert(record).map_err(store_rejection)?;

    Ok(warp::reply::json(&TokenResponse { username, token }))
}

pub async fn me(
    authorization: Option<String>,
    users: Arc<dyn UserStore>,
) -> Result<impl Reply, Rejection> {
    let record = authenticate(authorization, &users)?;
    Ok(warp::reply::json(&ProfileResponse {
        username: record.username,
        auth_provider: record.auth_provider,
        created_at: record.created_at,
        saved: record.saved,
    }))
}

/// Owner-only listing of every user record, bearer tokens included. Tokens
/// are stored and returned in the clear; treat this endpoint as sensitive.
pub async fn dashboard(
    authorization: Option<String>,
    users: Arc<dyn UserStore>,
    config: Arc<Config>,
) -> Result<impl Reply, Rejection> {
    let token = bearer_token(authorization).ok_or_else(|| {
        reject::custom(Unauthorized {
            message: "Missing bearer token".to_string(),
        })
    })?;

    let is_admin = config.admin_token.as_deref() == Some(token.as_str());
    let is_owner = match (&config.dashboard_owner, is_admin) {
        (_, true) => true,
        (Some(owner), false) => users
            .find_by_token(&token)
            .map_err(store_rejection)?
            .map(|u| &u.username == owner)
            .unwrap_or(false),
        (None, false) => false,
    };

    if !is_owner {
        return Err(reject::custom(Forbidden));
    }

    let all = users.list().map_err(store_rejection)?;
    Ok(warp::reply::json(&all))
}

pub async fn save_image(
    body: SaveRequest,
    authorization: Option<String>,
    users: Arc<dyn UserStore>,
) -> Result<impl Reply, Rejection> {
    if body.webformat_url.trim().is_empty() {
        return Err(reject::custom(ValidationError {
            message: "webformatURL is required".to_string(),
        }));
    }

    let mut record = authenticate(authorization, &users)?;
    let already_saved = record
        .saved
        .iter()
        .any(|s| s.webformat_url == body.webformat_url);
    if !already_saved {
        record.saved.push(SavedImage {
            webformat_url: body.webformat_url,
            tags: body.tags,
            provider: body.provider,
            saved_at: Utc::now(),
        });
        users.upsert(record.clone()).map_err(store_rejection)?;
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&record.saved),
        warp::http::StatusCode::CREATED,
    ))
}

pub async fn list_saved(
    authorization: Option<String>,
    users: Arc<dyn UserStore>,
) -> Result<impl Reply, Rejection> {
    let record = authenticate(authorization, &users)?;
    Ok(warp::reply::json(&record.saved))
}

pub fn build_auth_routes(
    users: Arc<dyn UserStore>,
    config: Arc<Config>,
    http: Arc<reqwest::Client>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let auth_signup = warp::path("auth")
        .and(warp::path("signup"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<CredentialsRequest>())
        .and(with_users(users.clone()))
        .and_then(signup);

    let auth_login = warp::path("auth")
        .and(warp::path("login"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<CredentialsRequest>())
        .and(with_users(users.clone()))
        .and_then(login);

    let auth_google = warp::path("auth")
        .and(warp::path("google"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<GoogleLoginRequest>())
        .and(with_users(users.clone()))
        .and(with_config(config.clone()))
        .and(with_http(http))
        .and_then(google_login);

    let me_route = warp::path("me")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_users(users.clone()))
        .and_then(me);

    let dashboard_route = warp::path("dashboard")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_users(users.clone()))
        .and(with_config(config))
        .and_then(dashboard);

    let save_route = warp::path("api")
        .and(warp::path("saves"))
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::json::<SaveRequest>())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_users(users.clone()))
        .and_then(save_image);

    let list_saved_route = warp::path("api")
        .and(warp::path("saves"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::header::optional::<String>("authorization"))
        .and(with_users(users))
        .and_then(list_saved);

    auth_signup
        .or(auth_login)
        .or(auth_google)
        .or(me_route)
        .or(dashboard_route)
        .or(save_route)
        .or(list_saved_route)
}

fn with_http(
    http: Arc<reqwest::Client>,
) -> impl Filter<Extract = (Arc<reqwest::Client>,), Error = std::convert::Infallible> + Clone {
    warp::any().map(move || http.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(
            bearer_token(Some("Bearer abc123".to_string())),
            Some("abc123".to_string())
        );
        assert_eq!(
            bearer_token(Some("bearer abc123".to_string())),
            Some("abc123".to_string())
        );
        assert_eq!(bearer_token(Some("Basic abc123".to_string())), None);
        assert_eq!(bearer_token(Some("Bearer ".to_string())), None);
        assert_eq!(bearer_token(None), None);
    }
}
