mod browser;
mod config;
mod routes;
mod services;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    // A missing .env file is fine; the process environment still applies.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = config::ServerConfig::from_env();
    let port = config.port;
    match &config.app_data_directory {
        Some(dir) => tracing::info!(dir = %dir.display(), "exports enabled"),
        None => tracing::warn!("APP_DATA_DIRECTORY not set; PDF export will be refused"),
    }
    tracing::info!(executable = %config.browser.executable, frontend = %config.frontend_base_url, "browser renderer configured");

    let renderer = browser::chrome::HeadlessChrome::new(&config.browser);
    let state = state::AppState::new(config, Arc::new(renderer));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "deckstream listening");
    axum::serve(listener, app).await.expect("server failed");
}
