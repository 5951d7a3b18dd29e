//! VIX Sentiment Service: binary entrypoint
//! Boots the Axum HTTP server and the background refresh scheduler.

use std::time::Duration;

use shuttle_axum::ShuttleAxum;
use vix_sentiment::ingest::scheduler::spawn_scheduler;

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    vix_sentiment::init_tracing();

    let app = vix_sentiment::app().await?;
    let interval = Duration::from_secs(app.config.refresh.interval_secs);
    tracing::info!(
        feeds = app.config.feeds.len(),
        interval_secs = interval.as_secs(),
        alpha = app.config.aggregation.alpha,
        "starting vix-sentiment"
    );
    spawn_scheduler(app.runner.clone(), interval);

    Ok(app.router.into())
}
