use axum::{
    routing::get,
    Router,
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use std::any::Any;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::api::models::EnrichedArticle;
use crate::api::response;
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::fetch_all;
use crate::AppState;

pub fn create_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config);

    Router::new()
        .route("/news", get(news_handler).options(|| async { StatusCode::NO_CONTENT }))
        .with_state(app_state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
        .layer(middleware::from_fn(preflight_no_content))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                path = %request.uri().path(),
            )
        }))
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::OPTIONS])
}

/// Preflight answers are empty, so report them as 204 rather than 200.
async fn preflight_no_content(request: Request, next: Next) -> Response {
    let is_preflight = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_preflight && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unexpected internal error".to_string()
    };
    error!(detail = %detail, "Request handler panicked");

    response::error(
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Unable to fetch news: {}", detail),
    )
    .into_response()
}

async fn news_handler(State(state): State<AppState>) -> Response {
    let start_time = std::time::Instant::now();

    let result = process_news_request(&state).await;
    let elapsed = start_time.elapsed();

    match result {
        Ok(articles) => {
            info!(count = articles.len(), ?elapsed, "Served aggregated news");
            response::success(articles).into_response()
        }
        Err(err) => {
            error!(error = %err, source = ?err.news_source(), ?elapsed, "Error fetching news");
            err.into_response()
        }
    }
}

async fn process_news_request(state: &AppState) -> Result<Vec<EnrichedArticle>> {
    let config = &state.config;

    let articles = fetch_all(
        &state.client,
        &config.news_api_url,
        &config.sources,
        &config.news_api_key,
    )
    .await?;
    info!(count = articles.len(), sources = config.sources.len(), "Fetched articles");

    Ok(articles.iter().map(|article| article.enrich()).collect())
}
