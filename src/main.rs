use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;
use news_sentiment_aggregator::{
    config::Config,
    api::routes::create_router,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;
    info!(sources = config.sources.len(), "Starting server on {}", server_addr);

    let app_state = AppState::new(config)?;
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;

    info!("Server running on http://{}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
