use futures::future::try_join_all;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::api::models::Article;
use crate::error::{AppError, Result};

/// Body of a top-headlines response. Only `articles` is read.
#[derive(Deserialize)]
struct TopHeadlines {
    #[serde(default)]
    articles: Option<Vec<Article>>,
}

/// Error body the news API sends with non-2xx responses.
#[derive(Deserialize)]
struct UpstreamError {
    code: Option<String>,
    message: Option<String>,
}

pub fn build_client(timeout: Option<Duration>) -> Result<Client> {
    let mut builder = ClientBuilder::new().pool_max_idle_per_host(10);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))
}

/// Fetches every source concurrently and concatenates their articles in source order.
///
/// The first failing source fails the whole call. Requests still in flight at
/// that point are left to finish in the background; their results are dropped.
pub async fn fetch_all(
    client: &Client,
    endpoint: &str,
    sources: &[String],
    api_key: &str,
) -> Result<Vec<Article>> {
    let handles = sources.iter().map(|source| {
        let client = client.clone();
        let endpoint = endpoint.to_string();
        let source = source.clone();
        let api_key = api_key.to_string();

        let task = tokio::spawn(async move { fetch_source(&client, &endpoint, &source, &api_key).await });
        async move {
            task.await
                .map_err(|e| AppError::FetchError(format!("Fetch task failed: {}", e)))?
        }
    });

    let per_source = try_join_all(handles).await?;
    Ok(per_source.into_iter().flatten().collect())
}

pub async fn fetch_source(
    client: &Client,
    endpoint: &str,
    source: &str,
    api_key: &str,
) -> Result<Vec<Article>> {
    debug!(source, "Requesting top headlines");
    let response = client
        .get(endpoint)
        .query(&[("sources", source), ("apiKey", api_key)])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        match response.json::<UpstreamError>().await {
            Ok(body) => warn!(
                source,
                status = status.as_u16(),
                code = body.code.as_deref().unwrap_or(""),
                message = body.message.as_deref().unwrap_or(""),
                "Upstream rejected request"
            ),
            Err(_) => warn!(source, status = status.as_u16(), "Upstream rejected request"),
        }
        return Err(AppError::UpstreamStatus {
            news_source: source.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await?;
    // A body without a readable `articles` array contributes nothing
    let articles = match serde_json::from_str::<TopHeadlines>(&body) {
        Ok(headlines) => headlines.articles.unwrap_or_default(),
        Err(e) => {
            warn!(source, error = %e, "Ignoring unreadable upstream body");
            Vec::new()
        }
    };
    debug!(source, count = articles.len(), "Received articles");
    Ok(articles)
}
