// src/ingest/scheduler.rs
//! Cycle runner and refresh timer.
//!
//! The working engine sits behind a `tokio::sync::Mutex`; a cycle takes it
//! with `try_lock`, so a timer tick or a manual refresh that arrives while a
//! cycle is in flight is skipped instead of queued. Readers never touch the
//! working engine: after each cycle a copy is published for the API.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use metrics::{counter, histogram};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::engine::{today_local, CycleReport, NewsView, ScorePreview, SentimentEngine, SentimentSnapshot};
use crate::ingest::types::{FeedSource, NewsItem};
use crate::ingest::{ensure_metrics_described, fetch_all};
use crate::store::NewsPersistence;

pub struct CycleRunner {
    working: Mutex<SentimentEngine>,
    published: RwLock<SentimentEngine>,
    sources: Vec<Arc<dyn FeedSource>>,
    persistence: Arc<dyn NewsPersistence>,
}

impl CycleRunner {
    pub fn new(
        engine: SentimentEngine,
        sources: Vec<Arc<dyn FeedSource>>,
        persistence: Arc<dyn NewsPersistence>,
    ) -> Self {
        ensure_metrics_described();
        Self {
            published: RwLock::new(engine.clone()),
            working: Mutex::new(engine),
            sources,
            persistence,
        }
    }

    /// Load retained news from persistence. Failures leave the store empty.
    pub async fn restore(&self) {
        let doc = match self.persistence.load().await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!(target: "engine", error = %format!("{e:#}"), "could not load news state, starting empty");
                return;
            }
        };
        let restored = doc.items.len();
        let mut engine = self.working.lock().await;
        engine.restore(doc);
        *self.published.write().await = engine.clone();
        tracing::info!(target: "engine", restored, "news state restored");
    }

    /// Run one cycle unless one is already running. `None` means skipped.
    pub async fn try_run_cycle(&self) -> Option<CycleReport> {
        let Ok(mut engine) = self.working.try_lock() else {
            counter!("sentiment_cycles_skipped_total").increment(1);
            tracing::info!(target: "ingest", "refresh skipped, cycle already in flight");
            return None;
        };

        let t0 = Instant::now();
        let items = fetch_all(&self.sources).await;
        let now = Utc::now();
        let report = engine.run_cycle(items, now, today_local(now));

        if let Err(e) = self.persistence.save(&engine.persisted()).await {
            tracing::warn!(target: "engine", error = %format!("{e:#}"), "saving news state failed");
        }
        *self.published.write().await = engine.clone();

        histogram!("sentiment_cycle_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        Some(report)
    }

    pub fn is_busy(&self) -> bool {
        self.working.try_lock().is_err()
    }

    pub async fn snapshot(&self) -> SentimentSnapshot {
        self.published.read().await.snapshot(Utc::now())
    }

    pub async fn news(&self, limit: Option<usize>) -> Vec<NewsView> {
        self.published.read().await.news(limit, Utc::now())
    }

    pub async fn preview(&self, item: &NewsItem) -> ScorePreview {
        self.published.read().await.preview(item, Utc::now())
    }

    pub async fn last_report(&self) -> Option<CycleReport> {
        self.published.read().await.last_report().cloned()
    }
}

/// Tick every `interval`, first tick immediately. Late ticks are dropped.
pub fn spawn_scheduler(runner: Arc<CycleRunner>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(target: "ingest", interval_secs = interval.as_secs(), feeds = runner.sources.len(), "refresh scheduler started");
        loop {
            ticker.tick().await;
            if let Some(rep) = runner.try_run_cycle().await {
                tracing::debug!(target: "ingest", state = rep.sentiment.state.as_str(), "scheduled refresh done");
            }
        }
    })
}
