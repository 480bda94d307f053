use std::net::TcpListener;
use std::path::Path;
use std::sync::Arc;

use log::{error, info};
use warp::Filter;

use pix_relay::config::Config;
use pix_relay::handlers_auth::build_auth_routes;
use pix_relay::handlers_health::build_health_routes;
use pix_relay::handlers_images::build_images_routes;
use pix_relay::upstream::ProviderClients;
use pix_relay::user_store::{FileUserStore, UserStore};
use pix_relay::warp_helpers::{cors, handle_rejection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let port = config.port;

    info!("Starting pix-relay server on Port {}", port);
    info!(
        "Default provider: {} (USE_PIXABAY={})",
        config.default_provider(),
        config.use_pixabay
    );
    info!("Users file: {}", config.users_file);

    // Check if port is available BEFORE initializing services
    if !is_port_available(port) {
        error!(
            "Port {} is already in use. Please stop any existing pix-relay instances or use a different port.",
            port
        );
        anyhow::bail!("Port {} is already in use", port);
    }

    let config = Arc::new(config);
    let clients = Arc::new(ProviderClients::new(&config));
    let users: Arc<dyn UserStore> = Arc::new(FileUserStore::open(Path::new(&config.users_file))?);
    let http = Arc::new(reqwest::Client::new());

    let health_routes = build_health_routes();
    let images_routes = build_images_routes(config.clone(), clients);
    let auth_routes = build_auth_routes(users, config.clone(), http);

    let routes = health_routes
        .or(images_routes)
        .or(auth_routes)
        .with(cors(&config))
        .with(warp::log("pix_relay"))
        .recover(handle_rejection);

    info!(
        "Server started successfully, listening on http://localhost:{}",
        port
    );

    warp::serve(routes).run(([0, 0, 0, 0], port)).await;

    Ok(())
}

fn is_port_available(port: u16) -> bool {
    TcpListener::bind(("0.0.0.0", port)).is_ok()
}
