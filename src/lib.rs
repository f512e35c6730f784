pub mod api;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod sentiment;
pub mod summarizer;

use std::sync::Arc;
use config::Config;
use error::Result;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: reqwest::Client,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let client = fetcher::build_client(config.upstream_timeout)?;
        Ok(AppState {
            config: Arc::new(config),
            client,
        })
    }
}
