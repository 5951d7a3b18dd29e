// tests/providers_http.rs
//! Transport chain against a local server standing in for the feed and both proxies.
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use vix_sentiment::config::TransportKind;
use vix_sentiment::ingest::fetch_all;
use vix_sentiment::ingest::providers::http::{build_client, HttpFeed, ProxyEndpoints};
use vix_sentiment::ingest::types::FeedSource;

const RSS: &str = r#"<rss version="2.0"><channel>
<item><title>Stocks slide as yields jump</title><pubDate>Mon, 08 Sep 2025 13:45:00 GMT</pubDate></item>
<item><title>Fed holds rates</title></item>
</channel></rss>"#;

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// `/up.xml` serves RSS, `/down.xml` is 503, `/ao/get` wraps RSS in JSON,
/// `/ao-empty/get` returns null contents, anything else (the prefix proxy) serves RSS.
async fn upstream() -> SocketAddr {
    let router = Router::new()
        .route("/up.xml", get(|| async { RSS }))
        .route("/down.xml", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
        .route(
            "/ao/get",
            get(|| async { Json(serde_json::json!({ "contents": RSS })) }),
        )
        .route(
            "/ao-empty/get",
            get(|| async { Json(serde_json::json!({ "contents": null })) }),
        )
        .fallback(|| async { RSS.into_response() });
    serve(router).await
}

fn feed(addr: SocketAddr, path: &str, transports: Vec<TransportKind>, ao: &str) -> HttpFeed {
    let client = build_client(Duration::from_secs(5)).unwrap();
    HttpFeed::new("local", &format!("http://{addr}{path}"), client, transports).with_endpoints(
        ProxyEndpoints {
            allorigins: format!("http://{addr}{ao}"),
            prefix: format!("http://{addr}/px/"),
        },
    )
}

#[tokio::test]
async fn direct_wins_when_up() {
    let addr = upstream().await;
    let f = feed(addr, "/up.xml", vec![TransportKind::Direct], "/ao/get");
    let items = f.fetch().await.unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].source, "local");
    assert!(items[0].published_at.is_some());
    assert!(items[1].published_at.is_none());
}

#[tokio::test]
async fn falls_back_to_allorigins() {
    let addr = upstream().await;
    let f = feed(
        addr,
        "/down.xml",
        vec![TransportKind::Direct, TransportKind::AllOrigins, TransportKind::Prefix],
        "/ao/get",
    );
    assert_eq!(f.fetch().await.unwrap().len(), 2);
}

#[tokio::test]
async fn empty_proxy_body_moves_on_to_prefix() {
    let addr = upstream().await;
    let f = feed(
        addr,
        "/down.xml",
        vec![TransportKind::Direct, TransportKind::AllOrigins, TransportKind::Prefix],
        "/ao-empty/get",
    );
    assert_eq!(f.fetch().await.unwrap().len(), 2);
}

#[tokio::test]
async fn exhausted_chain_is_an_empty_source() {
    let addr = upstream().await;
    let f = feed(
        addr,
        "/down.xml",
        vec![TransportKind::Direct, TransportKind::AllOrigins],
        "/ao-empty/get",
    );
    let err = f.fetch().await.unwrap_err();
    assert!(format!("{err:#}").contains("all transports failed"));

    let sources: Vec<Arc<dyn FeedSource>> = vec![Arc::new(f)];
    assert!(fetch_all(&sources).await.is_empty());
}
