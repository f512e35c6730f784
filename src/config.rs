use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_NEWS_API_URL: &str = "https://newsapi.org/v2/top-headlines";

pub const DEFAULT_SOURCES: [&str; 8] = [
    "cnn",
    "reuters",
    "bbc-news",
    "the-wall-street-journal",
    "associated-press",
    "bloomberg",
    "fox-news",
    "the-times-of-india",
];

pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "https://wandergram1.vercel.app",
    "http://localhost:5173",
    "http://localhost:3000",
];

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub news_api_key: String,
    pub news_api_url: String,
    pub sources: Vec<String>,
    pub allowed_origins: Vec<String>,
    /// `None` leaves outbound calls without a deadline.
    pub upstream_timeout: Option<Duration>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| keys.iter().find_map(|key| lookup(*key));

        let news_api_key = match first(&["NEWS_API_KEY", "VITE_NEWS_API_KEY"]) {
            Some(key) => key,
            None => {
                tracing::warn!("NEWS_API_KEY is not set; upstream requests will be rejected");
                String::new()
            }
        };

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = first(&["PORT", "VITE_PORT"]).unwrap_or_else(|| "3000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let news_api_url = lookup("NEWS_API_URL").unwrap_or_else(|| DEFAULT_NEWS_API_URL.to_string());

        let upstream_timeout = match lookup("NEWS_API_TIMEOUT_SECS") {
            Some(secs) => {
                let secs = secs
                    .parse::<u64>()
                    .map_err(|e| AppError::ConfigError(format!("Invalid upstream timeout: {}", e)))?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            news_api_key,
            news_api_url,
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect(),
            upstream_timeout,
        })
    }
}
