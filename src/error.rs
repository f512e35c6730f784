use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
};

use crate::api::response;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Request failed with status code {status}")]
    UpstreamStatus { news_source: String, status: u16 },

    #[error("{0}")]
    FetchError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl AppError {
    /// The news source whose request failed, when one is known.
    pub fn news_source(&self) -> Option<&str> {
        match self {
            AppError::UpstreamStatus { news_source, .. } => Some(news_source.as_str()),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Every failure that reaches a client aborts the whole aggregation.
        response::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unable to fetch news: {}", self),
        )
        .into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key as a query parameter.
        AppError::FetchError(err.without_url().to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
