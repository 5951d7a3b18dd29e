// src/ingest/providers/mod.rs
pub mod fixture;
pub mod http;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::config::EngineConfig;
use crate::ingest::types::FeedSource;

/// Build one HTTP source per configured feed, sharing a single client.
pub fn sources_from_config(cfg: &EngineConfig) -> Result<Vec<Arc<dyn FeedSource>>> {
    let client = http::build_client(Duration::from_secs(cfg.refresh.timeout_secs))?;
    Ok(cfg
        .feeds
        .iter()
        .map(|f| {
            Arc::new(http::HttpFeed::new(
                &f.id,
                &f.url,
                client.clone(),
                cfg.refresh.transports.clone(),
            )) as Arc<dyn FeedSource>
        })
        .collect())
}
