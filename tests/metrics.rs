// tests/metrics.rs
#![cfg(feature = "strict-metrics")]
//! Installs the global Prometheus recorder, so it only runs with
//! `--features strict-metrics` (one recorder per test binary).
use std::sync::Arc;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use vix_sentiment::build_app;
use vix_sentiment::config::EngineConfig;
use vix_sentiment::ingest::providers::fixture::{FailingFeed, FixtureFeed};
use vix_sentiment::ingest::types::FeedSource;
use vix_sentiment::store::MemoryPersistence;

#[tokio::test]
async fn metrics_endpoint_contains_expected_series() {
    let xml = std::fs::read_to_string("tests/fixtures/markets_rss.xml").expect("fixture");
    let sources: Vec<Arc<dyn FeedSource>> = vec![
        Arc::new(FixtureFeed::new("markets", &xml)),
        Arc::new(FailingFeed::new("offline")),
    ];
    let app = build_app(
        EngineConfig::default(),
        sources,
        Arc::new(MemoryPersistence::new()),
        true,
    )
    .await
    .expect("app with metrics");

    app.runner.try_run_cycle().await.expect("cycle ran");

    let resp = app
        .router
        .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();

    for needle in [
        "sentiment_cycles_total",
        "feed_items_total",
        "feed_errors_total",
        "items_irrelevant_total",
        "items_expired_total",
        "items_new_total",
        "sentiment_rolling_score",
        "sentiment_raw_cycle_score",
        "sentiment_state",
        "sentiment_cycle_ms",
        "rss_parse_ms",
    ] {
        assert!(
            text.contains(needle),
            "metrics exposition missing '{needle}'\n{text}"
        );
    }
}
