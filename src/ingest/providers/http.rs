// src/ingest/providers/http.rs
//! RSS over HTTP with a ranked transport chain.
//!
//! Each feed is tried through the configured transports in order (direct,
//! then the CORS proxies). The first transport that answers 2xx with a
//! parseable, non-empty body wins. If all fail the error is returned and the
//! gatherer treats the feed as empty for this cycle.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::TransportKind;
use crate::ingest::rss::parse_rss;
use crate::ingest::types::{FeedSource, NewsItem};

pub const ALLORIGINS_ENDPOINT: &str = "https://api.allorigins.win/get";
pub const PREFIX_PROXY: &str = "https://cors.isomorphic-git.org/";

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent("vix-sentiment/0.1")
        .connect_timeout(timeout.min(Duration::from_secs(4)))
        .timeout(timeout)
        .build()
        .context("building http client")
}

/// Proxy base URLs; overridable so the chain can be exercised locally.
#[derive(Debug, Clone)]
pub struct ProxyEndpoints {
    pub allorigins: String,
    pub prefix: String,
}

impl Default for ProxyEndpoints {
    fn default() -> Self {
        Self {
            allorigins: ALLORIGINS_ENDPOINT.to_string(),
            prefix: PREFIX_PROXY.to_string(),
        }
    }
}

impl ProxyEndpoints {
    pub fn request_url(&self, kind: TransportKind, feed_url: &str) -> Result<Url> {
        let url = match kind {
            TransportKind::Direct => Url::parse(feed_url),
            TransportKind::AllOrigins => {
                Url::parse_with_params(&self.allorigins, &[("url", feed_url)])
            }
            TransportKind::Prefix => Url::parse(&format!("{}{}", self.prefix, feed_url)),
        };
        url.with_context(|| format!("building {kind:?} url for {feed_url}"))
    }
}

/// allorigins wraps the upstream body in JSON.
#[derive(Debug, Deserialize)]
struct AllOriginsBody {
    #[serde(default)]
    contents: Option<String>,
}

pub struct HttpFeed {
    id: String,
    url: String,
    client: Client,
    transports: Vec<TransportKind>,
    endpoints: ProxyEndpoints,
}

impl HttpFeed {
    pub fn new(id: &str, url: &str, client: Client, transports: Vec<TransportKind>) -> Self {
        Self {
            id: id.to_string(),
            url: url.to_string(),
            client,
            transports,
            endpoints: ProxyEndpoints::default(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: ProxyEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    async fn fetch_via(&self, kind: TransportKind) -> Result<String> {
        let url = self.endpoints.request_url(kind, &self.url)?;
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("http get()")?
            .error_for_status()
            .context("http status")?;

        let body = match kind {
            TransportKind::AllOrigins => resp
                .json::<AllOriginsBody>()
                .await
                .context("allorigins json")?
                .contents
                .unwrap_or_default(),
            TransportKind::Direct | TransportKind::Prefix => {
                resp.text().await.context("http .text()")?
            }
        };

        if body.trim().is_empty() {
            bail!("empty body");
        }
        Ok(body)
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<Vec<NewsItem>> {
        let mut last_err = anyhow!("no transports configured");
        for &kind in &self.transports {
            let attempt = match self.fetch_via(kind).await {
                Ok(body) => parse_rss(&body, &self.id),
                Err(e) => Err(e),
            };
            match attempt {
                Ok(items) => {
                    tracing::debug!(target: "ingest", feed = %self.id, transport = ?kind, items = items.len(), "feed fetched");
                    return Ok(items);
                }
                Err(e) => {
                    tracing::debug!(target: "ingest", feed = %self.id, transport = ?kind, error = %format!("{e:#}"), "transport failed, trying next");
                    last_err = e.context(format!("{kind:?}"));
                }
            }
        }
        Err(last_err.context(format!("all transports failed for feed {}", self.id)))
    }

    fn id(&self) -> &str {
        &self.id
    }
}
