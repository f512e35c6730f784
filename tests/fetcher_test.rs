use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::Barrier;

use news_sentiment_aggregator::error::AppError;
use news_sentiment_aggregator::fetcher::{build_client, fetch_all, fetch_source};

fn sources(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn fetch_source_sends_source_and_key() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/top-headlines")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("sources".into(), "associated-press".into()),
            Matcher::UrlEncoded("apiKey".into(), "secret".into()),
        ]))
        .with_status(200)
        .with_body(json!({ "articles": [{ "title": "a" }, { "title": "b" }] }).to_string())
        .create_async()
        .await;

    let client = build_client(None).unwrap();
    let endpoint = format!("{}/top-headlines", server.url());
    let articles = fetch_source(&client, &endpoint, "associated-press", "secret").await.unwrap();

    assert_eq!(articles.len(), 2);
    assert_eq!(articles[1].fields["title"], "b");
    mock.assert_async().await;
}

#[tokio::test]
async fn null_articles_is_empty() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/top-headlines")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(r#"{"status":"ok","articles":null}"#)
        .create_async()
        .await;

    let client = build_client(None).unwrap();
    let endpoint = format!("{}/top-headlines", server.url());
    let articles = fetch_source(&client, &endpoint, "cnn", "key").await.unwrap();

    assert!(articles.is_empty());
}

#[tokio::test]
async fn fetch_all_preserves_source_order() {
    let mut server = Server::new_async().await;
    let mut mocks = Vec::new();
    for (source, count) in [("fox-news", 1), ("bbc-news", 3), ("cnn", 2)] {
        let articles: Vec<_> = (0..count)
            .map(|i| json!({ "title": format!("{source}-{i}") }))
            .collect();
        let mock = server
            .mock("GET", "/top-headlines")
            .match_query(Matcher::UrlEncoded("sources".into(), source.into()))
            .with_status(200)
            .with_body(json!({ "articles": articles }).to_string())
            .create_async()
            .await;
        mocks.push(mock);
    }

    let client = build_client(None).unwrap();
    let endpoint = format!("{}/top-headlines", server.url());
    let articles = fetch_all(&client, &endpoint, &sources(&["fox-news", "bbc-news", "cnn"]), "key")
        .await
        .unwrap();

    let titles: Vec<&str> = articles
        .iter()
        .map(|a| a.fields["title"].as_str().unwrap())
        .collect();
    assert_eq!(
        titles,
        vec!["fox-news-0", "bbc-news-0", "bbc-news-1", "bbc-news-2", "cnn-0", "cnn-1"]
    );
}

#[tokio::test]
async fn fetch_all_fails_when_any_source_fails() {
    let mut server = Server::new_async().await;
    let _ok = server
        .mock("GET", "/top-headlines")
        .match_query(Matcher::UrlEncoded("sources".into(), "cnn".into()))
        .with_status(200)
        .with_body(json!({ "articles": [{ "title": "fine" }] }).to_string())
        .create_async()
        .await;
    let _failing = server
        .mock("GET", "/top-headlines")
        .match_query(Matcher::UrlEncoded("sources".into(), "reuters".into()))
        .with_status(500)
        .with_body("upstream exploded")
        .create_async()
        .await;

    let client = build_client(None).unwrap();
    let endpoint = format!("{}/top-headlines", server.url());
    let err = fetch_all(&client, &endpoint, &sources(&["cnn", "reuters"]), "key")
        .await
        .unwrap_err();

    match err {
        AppError::UpstreamStatus { news_source, status } => {
            assert_eq!(news_source, "reuters");
            assert_eq!(status, 500);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn empty_source_list_yields_no_articles() {
    let client = build_client(None).unwrap();
    let articles = fetch_all(&client, "http://127.0.0.1:9/unused", &[], "key").await.unwrap();
    assert!(articles.is_empty());
}

#[tokio::test]
async fn non_json_body_yields_no_articles() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/top-headlines")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let client = build_client(None).unwrap();
    let endpoint = format!("{}/top-headlines", server.url());
    let articles = fetch_source(&client, &endpoint, "cnn", "key").await.unwrap();

    assert!(articles.is_empty());
}

/// Serves `{"articles": []}` but only once `expected` connections are open at the same time.
async fn spawn_gated_upstream(expected: usize) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let barrier = Arc::new(Barrier::new(expected));
    let peak = Arc::new(AtomicUsize::new(0));
    let open = Arc::new(AtomicUsize::new(0));

    let peak_seen = peak.clone();
    tokio::spawn(async move {
        loop {
            let (mut stream, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => return,
            };
            let barrier = barrier.clone();
            let peak = peak_seen.clone();
            let open = open.clone();
            tokio::spawn(async move {
                let now_open = open.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now_open, Ordering::SeqCst);

                let mut request: Vec<u8> = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                barrier.wait().await;

                let body = r#"{"status":"ok","articles":[]}"#;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes()).await;
                let _ = stream.shutdown().await;
                open.fetch_sub(1, Ordering::SeqCst);
            });
        }
    });

    (format!("http://{}/top-headlines", addr), peak)
}

#[tokio::test]
async fn fetch_all_issues_requests_concurrently() {
    let names = ["cnn", "reuters", "bbc-news", "bloomberg", "fox-news"];
    let (endpoint, peak) = spawn_gated_upstream(names.len()).await;

    let client = build_client(None).unwrap();
    // Sequential requests would never get past the gate
    let articles = tokio::time::timeout(
        Duration::from_secs(10),
        fetch_all(&client, &endpoint, &sources(&names), "key"),
    )
    .await
    .expect("requests were not all in flight together")
    .unwrap();

    assert!(articles.is_empty());
    assert_eq!(peak.load(Ordering::SeqCst), names.len());
}
