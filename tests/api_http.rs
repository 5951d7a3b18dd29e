// tests/api_http.rs
use std::sync::Arc;
use std::time::Duration;

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use tokio::sync::Notify;
use tower::ServiceExt;

use vix_sentiment::config::EngineConfig;
use vix_sentiment::ingest::providers::fixture::StaticFeed;
use vix_sentiment::ingest::types::{FeedSource, NewsItem};
use vix_sentiment::store::MemoryPersistence;
use vix_sentiment::{build_app, App};

fn item(title: &str, minutes_ago: i64) -> NewsItem {
    NewsItem {
        title: title.into(),
        description: String::new(),
        published_at: Some(Utc::now() - chrono::Duration::minutes(minutes_ago)),
        source: "static".into(),
        link: Some("https://example.com/x".into()),
    }
}

async fn build(sources: Vec<Arc<dyn FeedSource>>) -> App {
    build_app(
        EngineConfig::default(),
        sources,
        Arc::new(MemoryPersistence::new()),
        false,
    )
    .await
    .expect("app builds")
}

async fn json(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), 1_048_576).await.unwrap();
    let v = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, v)
}

#[tokio::test]
async fn refresh_then_read_state_and_news() {
    let feed = StaticFeed::new(
        "static",
        vec![
            item("Stocks crash as circuit breaker halts trading", 2),
            item("Treasury yields slip", 10),
        ],
    );
    let app = build(vec![Arc::new(feed)]).await;

    let (st, rep) = json(&app.router, Request::post("/refresh").body(Body::empty()).unwrap()).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(rep["scored"], 2);

    let (st, s) = json(&app.router, Request::get("/sentiment").body(Body::empty()).unwrap()).await;
    assert_eq!(st, StatusCode::OK);
    // -5 crash, -6 circuit breaker
    assert_eq!(s["rolling_score"], -11.0);
    assert_eq!(s["state"], "negative");
    assert_eq!(s["label"], "LONG VXX - clear risk-off");
    assert!(s["updated_at"].is_string());

    let (st, news) = json(&app.router, Request::get("/news?limit=1").body(Body::empty()).unwrap()).await;
    assert_eq!(st, StatusCode::OK);
    let arr = news.as_array().unwrap();
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["title"], "Stocks crash as circuit breaker halts trading");
    assert_eq!(arr[0]["severity"], "severe");
    assert_eq!(arr[0]["link"], "https://example.com/x");
}

#[tokio::test]
async fn score_preview_reports_breakdown() {
    let app = build(Vec::new()).await;
    let req = Request::post("/score")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"title":"FLASH: Nasdaq rally on dovish surprise"}"#))
        .unwrap();
    let (st, v) = json(&app.router, req).await;
    assert_eq!(st, StatusCode::OK);
    assert_eq!(v["relevant"], true);
    assert_eq!(v["urgent"], true);
    assert_eq!(v["keyword_score"], 5);
    assert_eq!(v["raw_score"], 7);
    assert_eq!(v["severity"], "strong");
    assert_eq!(v["hits"].as_array().unwrap().len(), 2);

    // preview never touches the retained list
    let (_, news) = json(&app.router, Request::get("/news").body(Body::empty()).unwrap()).await;
    assert!(news.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn irrelevant_preview_is_flagged() {
    let app = build(Vec::new()).await;
    let req = Request::post("/score")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"title":"Local bakery wins award","description":"Crowds cheer"}"#))
        .unwrap();
    let (_, v) = json(&app.router, req).await;
    assert_eq!(v["relevant"], false);
    assert_eq!(v["raw_score"], 0);
}

/// Blocks inside `fetch` until released.
struct GateFeed {
    entered: Notify,
    release: Notify,
}

#[async_trait::async_trait]
impl FeedSource for GateFeed {
    async fn fetch(&self) -> anyhow::Result<Vec<NewsItem>> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(Vec::new())
    }

    fn id(&self) -> &str {
        "gate"
    }
}

#[tokio::test]
async fn refresh_while_busy_is_conflict() {
    let gate = Arc::new(GateFeed {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let app = build(vec![gate.clone() as Arc<dyn FeedSource>]).await;

    let router = app.router.clone();
    let first = tokio::spawn(async move {
        router
            .oneshot(Request::post("/refresh").body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    });

    tokio::time::timeout(Duration::from_secs(5), gate.entered.notified())
        .await
        .expect("first refresh reached the fetch");
    assert!(app.runner.is_busy());

    let (st, v) = json(&app.router, Request::post("/refresh").body(Body::empty()).unwrap()).await;
    assert_eq!(st, StatusCode::CONFLICT);
    assert!(v["error"].is_string());

    gate.release.notify_one();
    assert_eq!(first.await.unwrap(), StatusCode::OK);
    assert!(!app.runner.is_busy());
}
