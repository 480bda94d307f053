pub mod config;
pub mod handlers_auth;
pub mod handlers_health;
pub mod handlers_images;
pub mod image_types;
pub mod merge;
pub mod normalize;
pub mod providers;
pub mod upstream;
pub mod user_store;
pub mod warp_helpers;
