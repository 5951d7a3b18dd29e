// src/lib.rs
// Public library surface for the binaries and integration tests.

pub mod alert;
pub mod analyze;
pub mod api;
pub mod config;
pub mod engine;
pub mod ingest;
pub mod metrics;
pub mod relevance;
pub mod rolling;
pub mod sentiment;
pub mod store;

pub use crate::api::router;
pub use crate::config::EngineConfig;
pub use crate::engine::SentimentEngine;

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::api::AppState;
use crate::ingest::scheduler::CycleRunner;
use crate::ingest::types::FeedSource;
use crate::store::{JsonFilePersistence, NewsPersistence};

pub const DEFAULT_LOG_FILTER: &str = "vix_sentiment=info,ingest=info,engine=info,alert=info,config=info,warn";

/// Compact logs filtered by `RUST_LOG` (default [`DEFAULT_LOG_FILTER`]).
/// A subscriber installed by the host runtime takes precedence.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

/// Wired service: HTTP router plus the runner the scheduler drives.
pub struct App {
    pub router: Router,
    pub runner: Arc<CycleRunner>,
    pub config: EngineConfig,
}

/// Assemble the service from explicit parts. Persisted news is restored
/// before the router is returned.
pub async fn build_app(
    config: EngineConfig,
    sources: Vec<Arc<dyn FeedSource>>,
    persistence: Arc<dyn NewsPersistence>,
    with_metrics: bool,
) -> Result<App> {
    // recorder first, so metric descriptions land in it
    let metrics = if with_metrics {
        Some(metrics::Metrics::init()?)
    } else {
        None
    };

    let engine = SentimentEngine::from_config(&config)?;
    let runner = Arc::new(CycleRunner::new(engine, sources, persistence));
    runner.restore().await;

    let mut router = api::router(AppState::new(runner.clone()));
    if let Some(m) = metrics {
        router = router.merge(m.router());
    }
    Ok(App {
        router,
        runner,
        config,
    })
}

/// Production wiring: config from disk/env, HTTP feeds, JSON state file, `/metrics`.
pub async fn app() -> Result<App> {
    let config = EngineConfig::load()?;
    let sources = ingest::providers::sources_from_config(&config)?;
    let persistence: Arc<dyn NewsPersistence> =
        Arc::new(JsonFilePersistence::new(config.retention.state_path.clone()));
    build_app(config, sources, persistence, true).await
}
