// src/ingest/providers/fixture.rs
//! In-memory sources for offline runs and tests.

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::ingest::rss::parse_rss;
use crate::ingest::types::{FeedSource, NewsItem};

/// Serves a fixed RSS document; parsed on every fetch like a live feed.
pub struct FixtureFeed {
    id: String,
    xml: String,
}

impl FixtureFeed {
    pub fn new(id: &str, xml: &str) -> Self {
        Self {
            id: id.to_string(),
            xml: xml.to_string(),
        }
    }
}

#[async_trait]
impl FeedSource for FixtureFeed {
    async fn fetch(&self) -> Result<Vec<NewsItem>> {
        parse_rss(&self.xml, &self.id)
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Serves pre-built items verbatim.
pub struct StaticFeed {
    id: String,
    items: Vec<NewsItem>,
}

impl StaticFeed {
    pub fn new(id: &str, items: Vec<NewsItem>) -> Self {
        Self {
            id: id.to_string(),
            items,
        }
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch(&self) -> Result<Vec<NewsItem>> {
        Ok(self.items.clone())
    }

    fn id(&self) -> &str {
        &self.id
    }
}

/// Always unavailable.
pub struct FailingFeed {
    id: String,
}

impl FailingFeed {
    pub fn new(id: &str) -> Self {
        Self { id: id.to_string() }
    }
}

#[async_trait]
impl FeedSource for FailingFeed {
    async fn fetch(&self) -> Result<Vec<NewsItem>> {
        bail!("feed {} unavailable", self.id)
    }

    fn id(&self) -> &str {
        &self.id
    }
}
