use std::sync::Arc;

use serde::Deserialize;
use warp::{reject, Filter, Rejection, Reply};

use crate::config::Config;
use crate::image_types::{Provider, SearchResponse};
use crate::merge::merge;
use crate::providers::{default_per_page, resolve_plan, Plan, PlanError};
use crate::upstream::ProviderClients;
use crate::warp_helpers::{with_clients, with_config, ConfigError, UpstreamFailure, ValidationError};

#[derive(Debug, Deserialize)]
pub struct ImagesQuery {
    pub query: Option<String>,
    pub page: Option<u32>,
    pub provider: Option<String>,
    pub per_page: Option<u32>,
}

pub async fn search_images(
    query: ImagesQuery,
    config: Arc<Config>,
    clients: Arc<ProviderClients>,
) -> Result<impl Reply, Rejection> {
    let q = query.query.as_deref().unwrap_or("").trim().to_string();
    if q.is_empty() {
        return Err(reject::custom(ValidationError {
            message: "Search query is required".to_string(),
        }));
    }

    let plan = resolve_plan(query.provider.as_deref(), &config).map_err(|e| match e {
        PlanError::MissingCredential { .. } => reject::custom(ConfigError {
            message: e.to_string(),
        }),
        PlanError::UnknownProvider(_) => reject::custom(ValidationError {
            message: e.to_string(),
        }),
    })?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or_else(|| default_per_page(plan)).max(1);

    log::info!(
        "Image search: query='{}' page={} per_page={} plan={:?}",
        q,
        page,
        per_page,
        plan
    );

    let response = match plan {
        Plan::Single(provider) => {
            let payload = clients
                .adapter_for(provider)
                .search(&q, page, per_page)
                .await
                .map_err(|e| {
                    log::error!("Upstream call failed: {}", e);
                    reject::custom(UpstreamFailure {
                        message: e.to_string(),
                    })
                })?;

            // Single-provider totalHits passes the upstream total through
            // unchanged, so it can exceed hits.len() due to provider paging.
            SearchResponse {
                total_hits: payload.upstream_total,
                hits: payload.hits,
            }
        }
        Plan::Combined => {
            // Fire both legs, wait for both; either failure fails the request.
            let pixabay = clients.adapter_for(Provider::Pixabay);
            let unsplash = clients.adapter_for(Provider::Unsplash);
            let (pixabay_payload, unsplash_payload) = tokio::try_join!(
                pixabay.search(&q, page, per_page),
                unsplash.search(&q, page, per_page),
            )
            .map_err(|e| {
                log::error!("Upstream call failed: {}", e);
                reject::custom(UpstreamFailure {
                    message: e.to_string(),
                })
            })?;

            let hits = merge(pixabay_payload.hits, unsplash_payload.hits);
            // Post-dedup count, not the sum of the upstream totals.
            SearchResponse {
                total_hits: hits.len() as u64,
                hits,
            }
        }
    };

    Ok(warp::reply::json(&response))
}

pub fn build_images_routes(
    config: Arc<Config>,
    clients: Arc<ProviderClients>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    warp::path("api")
        .and(warp::path("images"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<ImagesQuery>())
        .and(with_config(config))
        .and(with_clients(clients))
        .and_then(search_images)
}
