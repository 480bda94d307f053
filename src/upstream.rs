use async_trait::async_trait;
use thiserror::Error;

use crate::config::Config;
use crate::image_types::{
    ImageHit, PinterestResponse, PixabayResponse, Provider, UnsplashResponse,
};
use crate::normalize::{normalize_pinterest, normalize_pixabay, normalize_unsplash};

/// One provider's response after normalization. `upstream_total` is the
/// total the provider itself reported, which can exceed `hits.len()` because
/// of provider-side paging.
#[derive(Debug, Clone)]
pub struct ProviderPayload {
    pub upstream_total: u64,
    pub hits: Vec<ImageHit>,
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{provider} returned status {status}")]
    Status { provider: Provider, status: u16 },
    #[error("{provider} request failed: {message}")]
    Transport { provider: Provider, message: String },
}

impl UpstreamError {
    fn transport(provider: Provider, err: reqwest::Error) -> Self {
        UpstreamError::Transport {
            provider,
            message: err.to_string(),
        }
    }
}

/// One upstream stock-photo API. Each adapter owns its fixed auth mechanism
/// and paging conventions; normalization happens inside the adapter so
/// callers only ever see `ImageHit`s.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn provider(&self) -> Provider;

    async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<ProviderPayload, UpstreamError>;
}

pub struct PixabayClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

#[async_trait]
impl ProviderAdapter for PixabayClient {
    fn provider(&self) -> Provider {
        Provider::Pixabay
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<ProviderPayload, UpstreamError> {
        // Pixabay authenticates with a `key` query parameter.
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("image_type", "photo"),
                ("per_page", &per_page.to_string()),
                ("page", &page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::transport(Provider::Pixabay, e))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                provider: Provider::Pixabay,
                status: response.status().as_u16(),
            });
        }

        let raw: PixabayResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::transport(Provider::Pixabay, e))?;

        let upstream_total = raw.total_hits.unwrap_or(raw.hits.len() as u64);
        let hits = raw.hits.into_iter().map(normalize_pixabay).collect();
        Ok(ProviderPayload {
            upstream_total,
            hits,
        })
    }
}

pub struct UnsplashClient {
    client: reqwest::Client,
    api_url: String,
    access_key: String,
}

#[async_trait]
impl ProviderAdapter for UnsplashClient {
    fn provider(&self) -> Provider {
        Provider::Unsplash
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<ProviderPayload, UpstreamError> {
        // Unsplash authenticates with a Client-ID authorization header.
        let response = self
            .client
            .get(&self.api_url)
            .header("Authorization", format!("Client-ID {}", self.access_key))
            .query(&[
                ("query", query),
                ("page", &page.to_string()),
                ("per_page", &per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::transport(Provider::Unsplash, e))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                provider: Provider::Unsplash,
                status: response.status().as_u16(),
            });
        }

        let raw: UnsplashResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::transport(Provider::Unsplash, e))?;

        let upstream_total = raw.total.unwrap_or(raw.results.len() as u64);
        let hits = raw.results.into_iter().map(normalize_unsplash).collect();
        Ok(ProviderPayload {
            upstream_total,
            hits,
        })
    }
}

pub struct PinterestClient {
    client: reqwest::Client,
    api_url: String,
    access_token: String,
}

#[async_trait]
impl ProviderAdapter for PinterestClient {
    fn provider(&self) -> Provider {
        Provider::Pinterest
    }

    async fn search(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<ProviderPayload, UpstreamError> {
        // Pinterest authenticates with a bearer token.
        let response = self
            .client
            .get(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("Accept", "application/json")
            .query(&[
                ("query", query),
                ("page", &page.to_string()),
                ("page_size", &per_page.to_string()),
            ])
            .send()
            .await
            .map_err(|e| UpstreamError::transport(Provider::Pinterest, e))?;

        if !response.status().is_success() {
            return Err(UpstreamError::Status {
                provider: Provider::Pinterest,
                status: response.status().as_u16(),
            });
        }

        let raw: PinterestResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::transport(Provider::Pinterest, e))?;

        let upstream_total = raw.total.or(raw.count);
        let items = raw.into_items();
        let upstream_total = upstream_total.unwrap_or(items.len() as u64);
        let hits = items.into_iter().map(normalize_pinterest).collect();
        Ok(ProviderPayload {
            upstream_total,
            hits,
        })
    }
}

/// The closed set of provider adapters, built once at startup and selected
/// by provider enum rather than string branching.
pub struct ProviderClients {
    pixabay: PixabayClient,
    unsplash: UnsplashClient,
    pinterest: PinterestClient,
}

impl ProviderClients {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::new();
        ProviderClients {
            pixabay: PixabayClient {
                client: client.clone(),
                api_url: config.pixabay_api_url.clone(),
                api_key: config.pixabay_api_key.clone().unwrap_or_default(),
            },
            unsplash: UnsplashClient {
                client: client.clone(),
                api_url: config.unsplash_api_url.clone(),
                access_key: config.unsplash_access_key.clone().unwrap_or_default(),
            },
            pinterest: PinterestClient {
                client,
                api_url: config.pinterest_api_url.clone(),
                access_token: config.pinterest_access_token.clone().unwrap_or_default(),
            },
        }
    }

    pub fn adapter_for(&self, provider: Provider) -> &dyn ProviderAdapter {
        match provider {
            Provider::Pixabay => &self.pixabay,
            Provider::Unsplash => &self.unsplash,
            Provider::Pinterest => &self.pinterest,
        }
    }
}
