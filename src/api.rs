use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use tower_http::cors::CorsLayer;

use crate::ingest::scheduler::CycleRunner;
use crate::ingest::types::NewsItem;

#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<CycleRunner>,
}

impl AppState {
    pub fn new(runner: Arc<CycleRunner>) -> Self {
        Self { runner }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/sentiment", get(sentiment))
        .route("/news", get(news))
        .route("/score", post(score))
        .route("/refresh", post(refresh))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn sentiment(State(state): State<AppState>) -> Response {
    Json(state.runner.snapshot().await).into_response()
}

#[derive(serde::Deserialize)]
struct NewsQuery {
    #[serde(default)]
    limit: Option<usize>,
}

async fn news(State(state): State<AppState>, Query(q): Query<NewsQuery>) -> Response {
    Json(state.runner.news(q.limit).await).into_response()
}

#[derive(serde::Deserialize)]
struct ScoreReq {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    published_at: Option<DateTime<Utc>>,
}

async fn score(State(state): State<AppState>, Json(body): Json<ScoreReq>) -> Response {
    let item = NewsItem {
        title: crate::ingest::normalize_text(&body.title),
        description: crate::ingest::normalize_text(body.description.as_deref().unwrap_or_default()),
        published_at: body.published_at,
        source: "preview".to_string(),
        link: None,
    };
    Json(state.runner.preview(&item).await).into_response()
}

async fn refresh(State(state): State<AppState>) -> Response {
    match state.runner.try_run_cycle().await {
        Some(report) => Json(report).into_response(),
        None => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "error": "refresh already in progress" })),
        )
            .into_response(),
    }
}
