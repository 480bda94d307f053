use std::convert::Infallible;
use std::sync::Arc;

use serde::Serialize;
use warp::{reject, Filter, Rejection, Reply};

use crate::config::Config;
use crate::upstream::ProviderClients;
use crate::user_store::UserStore;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub timestamp: String,
}

/// Request resolved to a provider whose credential is not configured.
/// Always a client error; no upstream call was made.
#[derive(Debug)]
pub struct ConfigError {
    pub message: String,
}

impl reject::Reject for ConfigError {}

#[derive(Debug)]
pub struct ValidationError {
    pub message: String,
}

impl reject::Reject for ValidationError {}

/// Non-success status or network failure from a provider call.
#[derive(Debug)]
pub struct UpstreamFailure {
    pub message: String,
}

impl reject::Reject for UpstreamFailure {}

#[derive(Debug)]
pub struct StoreFailure {
    pub message: String,
}

impl reject::Reject for StoreFailure {}

#[derive(Debug)]
pub struct Unauthorized {
    pub message: String,
}

impl reject::Reject for Unauthorized {}

#[derive(Debug)]
pub struct Forbidden;

impl reject::Reject for Forbidden {}

#[derive(Debug)]
pub struct Conflict {
    pub message: String,
}

impl reject::Reject for Conflict {}

pub fn with_config(
    config: Arc<Config>,
) -> impl Filter<Extract = (Arc<Config>,), Error = Infallible> + Clone {
    warp::any().map(move || config.clone())
}

pub fn with_clients(
    clients: Arc<ProviderClients>,
) -> impl Filter<Extract = (Arc<ProviderClients>,), Error = Infallible> + Clone {
    warp::any().map(move || clients.clone())
}

pub fn with_users(
    users: Arc<dyn UserStore>,
) -> impl Filter<Extract = (Arc<dyn UserStore>,), Error = Infallible> + Clone {
    warp::any().map(move || users.clone())
}

pub async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;
    let timestamp = chrono::Utc::now().to_rfc3339();

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(config_error) = err.find::<ConfigError>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = config_error.message.clone();
    } else if let Some(validation_error) = err.find::<ValidationError>() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = validation_error.message.clone();
    } else if let Some(unauthorized) = err.find::<Unauthorized>() {
        code = warp::http::StatusCode::UNAUTHORIZED;
        message = unauthorized.message.clone();
    } else if err.find::<Forbidden>().is_some() {
        code = warp::http::StatusCode::FORBIDDEN;
        message = "Forbidden".to_string();
    } else if let Some(conflict) = err.find::<Conflict>() {
        code = warp::http::StatusCode::CONFLICT;
        message = conflict.message.clone();
    } else if let Some(upstream) = err.find::<UpstreamFailure>() {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = format!("Failed to fetch images: {}", upstream.message);
    } else if let Some(store) = err.find::<StoreFailure>() {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = store.message.clone();
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        code = warp::http::StatusCode::PAYLOAD_TOO_LARGE;
        message = "Payload too large".to_string();
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        code = warp::http::StatusCode::METHOD_NOT_ALLOWED;
        message = "Method not allowed".to_string();
    } else {
        log::error!("Unhandled rejection: {:?}", err);
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal server error".to_string();
    }

    let error_response = ErrorResponse {
        error: message,
        code: code.as_u16(),
        timestamp,
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&error_response),
        code,
    ))
}

pub fn cors(config: &Config) -> warp::cors::Builder {
    let builder = warp::cors()
        .allow_headers(vec!["content-type", "authorization", "accept"])
        .allow_methods(vec!["GET", "POST", "OPTIONS"]);

    if config.cors_allowed_origins.is_empty() {
        builder.allow_any_origin()
    } else {
        builder.allow_origins(config.cors_allowed_origins.iter().map(|o| o.as_str()))
    }
}
