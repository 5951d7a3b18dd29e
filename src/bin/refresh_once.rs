//! Run a single refresh cycle and print the result as JSON.
//!
//! `refresh_once [--fixture <rss-file>] [--ephemeral]`
//! `--fixture` scores a local RSS document instead of the configured feeds;
//! `--ephemeral` keeps the news state in memory instead of the state file.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use vix_sentiment::ingest::providers::{fixture::FixtureFeed, sources_from_config};
use vix_sentiment::ingest::types::FeedSource;
use vix_sentiment::store::{JsonFilePersistence, MemoryPersistence, NewsPersistence};
use vix_sentiment::{build_app, init_tracing, EngineConfig};

#[derive(Parser, Debug)]
#[command(name = "refresh_once", about = "Run one sentiment refresh cycle and print it as JSON")]
struct Args {
    /// Score a local RSS document instead of the configured feeds
    #[arg(long)]
    fixture: Option<PathBuf>,
    /// Keep news state in memory, leaving the state file untouched
    #[arg(long)]
    ephemeral: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = EngineConfig::load()?;
    let sources: Vec<Arc<dyn FeedSource>> = match &args.fixture {
        Some(path) => {
            let xml = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading fixture {}", path.display()))?;
            vec![Arc::new(FixtureFeed::new("fixture", &xml))]
        }
        None => sources_from_config(&config)?,
    };
    let persistence: Arc<dyn NewsPersistence> = if args.ephemeral {
        Arc::new(MemoryPersistence::new())
    } else {
        Arc::new(JsonFilePersistence::new(config.retention.state_path.clone()))
    };

    let app = build_app(config, sources, persistence, false).await?;
    let Some(report) = app.runner.try_run_cycle().await else {
        bail!("cycle skipped");
    };
    let out = serde_json::json!({
        "report": report,
        "sentiment": app.runner.snapshot().await,
        "news": app.runner.news(None).await,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
