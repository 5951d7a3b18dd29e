// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Raw headline handed to the core; immutable once fetched.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq, Default)]
pub struct NewsItem {
    pub title: String,       // normalized, may be empty
    pub description: String, // normalized, may be empty
    pub published_at: Option<DateTime<Utc>>, // None when missing or unparseable
    pub source: String,      // feed id, e.g. "cnbc-markets"
    pub link: Option<String>,
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<NewsItem>>;
    fn id(&self) -> &str;
}
