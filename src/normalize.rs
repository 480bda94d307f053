use crate::image_types::{
    ImageHit, PinterestItem, PixabayHit, Provider, UnsplashResult,
};

fn first_non_empty(candidates: &[Option<&str>]) -> String {
    candidates
        .iter()
        .flatten()
        .find(|s| !s.is_empty())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

pub fn normalize_pixabay(hit: PixabayHit) -> ImageHit {
    ImageHit {
        webformat_url: first_non_empty(&[
            hit.webformat_url.as_deref(),
            hit.preview_url.as_deref(),
            hit.large_image_url.as_deref(),
        ]),
        tags: hit.tags.unwrap_or_default(),
        likes: hit.likes.unwrap_or(0),
        views: hit.views.unwrap_or(0),
        user: hit.user.unwrap_or_default(),
        provider: Provider::Pixabay,
    }
}

pub fn normalize_unsplash(result: UnsplashResult) -> ImageHit {
    let urls = result.urls.unwrap_or_default();
    let user = result.user.unwrap_or_default();
    ImageHit {
        webformat_url: first_non_empty(&[
            urls.small.as_deref(),
            urls.regular.as_deref(),
            urls.full.as_deref(),
        ]),
        tags: first_non_empty(&[
            result.alt_description.as_deref(),
            result.description.as_deref(),
        ]),
        likes: result.likes.unwrap_or(0),
        // Unsplash search results do not expose a view counter; stays 0.
        views: result.views.unwrap_or(0),
        user: first_non_empty(&[user.username.as_deref(), user.name.as_deref()]),
        provider: Provider::Unsplash,
    }
}

pub fn normalize_pinterest(item: PinterestItem) -> ImageHit {
    let original_url = item
        .images
        .and_then(|images| images.original)
        .and_then(|original| original.url);
    let first_media = item
        .media
        .and_then(|media| media.into_iter().next())
        .map(|m| first_non_empty(&[m.url.as_deref(), m.src.as_deref()]));
    let owner = item.owner.unwrap_or_default();
    let creator = item.creator.unwrap_or_default();

    ImageHit {
        webformat_url: first_non_empty(&[
            original_url.as_deref(),
            item.image_url.as_deref(),
            first_media.as_deref(),
        ]),
        tags: first_non_empty(&[
            item.description.as_deref(),
            item.title.as_deref(),
            item.alt_text.as_deref(),
        ]),
        likes: item.reactions_count.or(item.like_count).unwrap_or(0),
        views: item.view_count.unwrap_or(0),
        user: first_non_empty(&[
            owner.username.as_deref(),
            owner.name.as_deref(),
            creator.username.as_deref(),
            creator.name.as_deref(),
        ]),
        provider: Provider::Pinterest,
    }
}
