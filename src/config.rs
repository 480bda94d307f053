use std::env;

use crate::image_types::Provider;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,

    pub pixabay_api_key: Option<String>,
    pub pixabay_api_url: String,
    pub unsplash_access_key: Option<String>,
    pub unsplash_api_url: String,
    pub pinterest_access_token: Option<String>,
    pub pinterest_api_url: String,

    /// Feature flag: when set, Pixabay is the default provider instead of Unsplash.
    pub use_pixabay: bool,

    /// Empty list means any origin is allowed.
    pub cors_allowed_origins: Vec<String>,

    pub users_file: String,
    pub admin_token: Option<String>,
    pub dashboard_owner: Option<String>,
    pub google_client_id: Option<String>,
    pub google_tokeninfo_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            pixabay_api_key: env::var("PIXABAY_API_KEY").ok().filter(|k| !k.is_empty()),
            pixabay_api_url: env::var("PIXABAY_API_URL")
                .unwrap_or_else(|_| "https://pixabay.com/api/".to_string()),
            unsplash_access_key: env::var("UNSPLASH_ACCESS_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            unsplash_api_url: env::var("UNSPLASH_API_URL")
                .unwrap_or_else(|_| "https://api.unsplash.com/search/photos".to_string()),
            pinterest_access_token: env::var("PINTEREST_ACCESS_TOKEN")
                .ok()
                .filter(|k| !k.is_empty()),
            pinterest_api_url: env::var("PINTEREST_API_URL")
                .unwrap_or_else(|_| "https://api.pinterest.com/v5/search/pins".to_string()),
            use_pixabay: env::var("USE_PIXABAY")
                .map(|v| v == "true")
                .unwrap_or(false),
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            users_file: env::var("USERS_FILE").unwrap_or_else(|_| "./data/users.json".to_string()),
            admin_token: env::var("ADMIN_TOKEN").ok().filter(|t| !t.is_empty()),
            dashboard_owner: env::var("DASHBOARD_OWNER").ok().filter(|o| !o.is_empty()),
            google_client_id: env::var("GOOGLE_CLIENT_ID").ok().filter(|c| !c.is_empty()),
            google_tokeninfo_url: env::var("GOOGLE_TOKENINFO_URL")
                .unwrap_or_else(|_| "https://oauth2.googleapis.com/tokeninfo".to_string()),
        })
    }

    /// Default provider when the request does not name one.
    pub fn default_provider(&self) -> Provider {
        if self.use_pixabay {
            Provider::Pixabay
        } else {
            Provider::Unsplash
        }
    }
}

/// Fully-populated config for unit and integration tests.
pub fn test_config() -> Config {
    Config {
        port: 5000,
        host: "127.0.0.1".to_string(),
        pixabay_api_key: Some("pix-key".to_string()),
        pixabay_api_url: "https://pixabay.example/api/".to_string(),
        unsplash_access_key: Some("unsplash-key".to_string()),
        unsplash_api_url: "https://unsplash.example/search/photos".to_string(),
        pinterest_access_token: Some("pinterest-token".to_string()),
        pinterest_api_url: "https://pinterest.example/v5/search/pins".to_string(),
        use_pixabay: false,
        cors_allowed_origins: vec![],
        users_file: "./users.json".to_string(),
        admin_token: Some("admin-token".to_string()),
        dashboard_owner: None,
        google_client_id: None,
        google_tokeninfo_url: "https://tokeninfo.example/tokeninfo".to_string(),
    }
}
