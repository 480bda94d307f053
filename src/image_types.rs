use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One upstream stock-photo API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Pixabay,
    Unsplash,
    Pinterest,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Pixabay => "pixabay",
            Provider::Unsplash => "unsplash",
            Provider::Pinterest => "pinterest",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pixabay" => Ok(Provider::Pixabay),
            "unsplash" => Ok(Provider::Unsplash),
            "pinterest" => Ok(Provider::Pinterest),
            _ => Err(()),
        }
    }
}

/// The normalized record every provider payload is mapped into.
///
/// Wire names follow the original Pixabay-style contract the front end
/// consumes (`webformatURL`, `totalHits`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHit {
    #[serde(rename = "webformatURL")]
    pub webformat_url: String,
    pub tags: String,
    pub likes: u64,
    pub views: u64,
    pub user: String,
    pub provider: Provider,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(rename = "totalHits")]
    pub total_hits: u64,
    pub hits: Vec<ImageHit>,
}

// Raw upstream shapes. Every field is optional: missing or oddly-typed data
// degrades to defaults during normalization instead of failing the request.

#[derive(Debug, Default, Deserialize)]
pub struct PixabayHit {
    #[serde(rename = "webformatURL")]
    pub webformat_url: Option<String>,
    #[serde(rename = "previewURL")]
    pub preview_url: Option<String>,
    #[serde(rename = "largeImageURL")]
    pub large_image_url: Option<String>,
    pub tags: Option<String>,
    pub likes: Option<u64>,
    pub views: Option<u64>,
    pub user: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PixabayResponse {
    #[serde(rename = "totalHits")]
    pub total_hits: Option<u64>,
    #[serde(default)]
    pub hits: Vec<PixabayHit>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnsplashUrls {
    pub small: Option<String>,
    pub regular: Option<String>,
    pub full: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnsplashUser {
    pub username: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnsplashResult {
    pub urls: Option<UnsplashUrls>,
    pub alt_description: Option<String>,
    pub description: Option<String>,
    pub likes: Option<u64>,
    pub views: Option<u64>,
    pub user: Option<UnsplashUser>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UnsplashResponse {
    pub total: Option<u64>,
    #[serde(default)]
    pub results: Vec<UnsplashResult>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PinterestImage {
    pub url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PinterestImages {
    pub original: Option<PinterestImage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PinterestMedia {
    pub url: Option<String>,
    pub src: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PinterestAccount {
    pub username: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PinterestItem {
    pub images: Option<PinterestImages>,
    pub image_url: Option<String>,
    pub media: Option<Vec<PinterestMedia>>,
    pub description: Option<String>,
    pub title: Option<String>,
    pub alt_text: Option<String>,
    pub reactions_count: Option<u64>,
    pub like_count: Option<u64>,
    pub view_count: Option<u64>,
    pub owner: Option<PinterestAccount>,
    pub creator: Option<PinterestAccount>,
}

/// Pinterest's search surface has shipped the hit list under different field
/// names over time; accept all three.
#[derive(Debug, Default, Deserialize)]
pub struct PinterestResponse {
    pub total: Option<u64>,
    pub count: Option<u64>,
    pub items: Option<Vec<PinterestItem>>,
    pub results: Option<Vec<PinterestItem>>,
    pub data: Option<Vec<PinterestItem>>,
}

impl PinterestResponse {
    pub fn into_items(self) -> Vec<PinterestItem> {
        self.items
            .or(self.results)
            .or(self.data)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_roundtrip() {
        assert_eq!("pixabay".parse::<Provider>(), Ok(Provider::Pixabay));
        assert_eq!("unsplash".parse::<Provider>(), Ok(Provider::Unsplash));
        assert_eq!("pinterest".parse::<Provider>(), Ok(Provider::Pinterest));
        assert_eq!("flickr".parse::<Provider>(), Err(()));

        assert_eq!(format!("{}", Provider::Pixabay), "pixabay");
    }

    #[test]
    fn test_image_hit_wire_names() {
        let hit = ImageHit {
            webformat_url: "https://img.example/a.jpg".to_string(),
            tags: "cat".to_string(),
            likes: 3,
            views: 9,
            user: "alice".to_string(),
            provider: Provider::Unsplash,
        };
        let json = serde_json::to_value(&hit).unwrap();
        assert_eq!(json["webformatURL"], "https://img.example/a.jpg");
        assert_eq!(json["provider"], "unsplash");
    }

    #[test]
    fn test_pixabay_response_tolerates_missing_fields() {
        let raw: PixabayResponse = serde_json::from_str(r#"{"hits":[{}]}"#).unwrap();
        assert_eq!(raw.hits.len(), 1);
        assert!(raw.total_hits.is_none());
        assert!(raw.hits[0].webformat_url.is_none());
    }

    #[test]
    fn test_pinterest_item_list_aliases() {
        let via_items: PinterestResponse =
            serde_json::from_str(r#"{"items":[{"image_url":"x"}]}"#).unwrap();
        assert_eq!(via_items.into_items().len(), 1);

        let via_data: PinterestResponse =
            serde_json::from_str(r#"{"data":[{},{}]}"#).unwrap();
        assert_eq!(via_data.into_items().len(), 2);
    }
}
