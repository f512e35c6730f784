use serde::Serialize;
use axum::Json;
use axum::http::StatusCode;

use crate::api::models::{EnrichedArticle, NewsResponse};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn success(articles: Vec<EnrichedArticle>) -> (StatusCode, Json<NewsResponse>) {
    (StatusCode::OK, Json(NewsResponse { articles }))
}

pub fn error(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: message }))
}
