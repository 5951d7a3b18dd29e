// src/ingest/mod.rs
pub mod providers;
pub mod rss;
pub mod scheduler;
pub mod types;

use crate::ingest::types::{FeedSource, NewsItem};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::task::JoinSet;

/// One-time metrics registration (so series show up on /metrics).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_items_total", "Items parsed from feeds.");
        describe_counter!("feed_errors_total", "Feed fetch/parse failures.");
        describe_counter!(
            "items_irrelevant_total",
            "Items dropped by the relevance filter."
        );
        describe_counter!(
            "items_expired_total",
            "Items dropped for being older than the decay cutoff."
        );
        describe_counter!(
            "items_new_total",
            "Items added to the retention store."
        );
        describe_counter!("sentiment_cycles_total", "Completed refresh cycles.");
        describe_counter!(
            "sentiment_cycles_skipped_total",
            "Refresh triggers skipped because a cycle was in flight."
        );
        describe_gauge!("sentiment_rolling_score", "Smoothed rolling score.");
        describe_gauge!("sentiment_effective_score", "Rolling score after the session factor.");
        describe_gauge!("sentiment_raw_cycle_score", "Sum of decayed scores of the last cycle.");
        describe_gauge!("sentiment_state", "Current band, -2 (crash) .. 2 (melt-up).");
        describe_histogram!("sentiment_cycle_ms", "Cycle duration in milliseconds.");
        describe_histogram!("rss_parse_ms", "RSS parse time in milliseconds.");
    });
}

/// Normalize feed text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    // 1) HTML entity decode
    let mut out = html_escape::decode_html_entities(s).to_string();

    // 2) Strip HTML tags
    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, " ").to_string();

    // 3) Normalize “ ” ‘ ’ « » to ASCII quotes
    out = out
        .replace(['\u{201C}', '\u{201D}', '\u{00AB}', '\u{00BB}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'");

    // 4) Collapse whitespace
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out = out.trim().to_string();

    // 5) Strip trailing sentence punctuation (keep quotes)
    while let Some(last) = out.chars().last() {
        if matches!(last, '!' | '?' | '.' | ',') {
            out.pop();
        } else {
            break;
        }
    }

    // 6) Length cap: 1500 chars
    if out.chars().count() > 1500 {
        out = out.chars().take(1500).collect();
    }

    out
}

/// Fetch every source concurrently and gather the results.
///
/// A failing or panicking source contributes zero items; the rest of the
/// batch is unaffected. Returns only after every fetch settled, so callers
/// always score a complete cycle.
pub async fn fetch_all(sources: &[Arc<dyn FeedSource>]) -> Vec<NewsItem> {
    ensure_metrics_described();

    let mut set = JoinSet::new();
    for src in sources {
        let src = Arc::clone(src);
        set.spawn(async move {
            let id = src.id().to_string();
            (id, src.fetch().await)
        });
    }

    let mut out = Vec::new();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((_, Ok(mut items))) => out.append(&mut items),
            Ok((id, Err(e))) => {
                tracing::warn!(target: "ingest", error = %format!("{e:#}"), feed = %id, "feed unavailable, treating as empty");
                counter!("feed_errors_total").increment(1);
            }
            Err(e) => {
                tracing::warn!(target: "ingest", error = ?e, "feed task aborted, treating as empty");
                counter!("feed_errors_total").increment(1);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::providers::fixture::{FailingFeed, FixtureFeed};

    #[test]
    fn normalize_text_collapses_ws_and_punct() {
        let s = "  Hello,&nbsp;&nbsp; world!!!  ";
        let out = normalize_text(s);
        assert_eq!(out, "Hello, world");
    }

    #[test]
    fn normalize_text_strips_tags_without_gluing_words() {
        assert_eq!(normalize_text("<p>Dow</p><p>slides</p>"), "Dow slides");
    }

    #[tokio::test]
    async fn failed_source_does_not_sink_the_batch() {
        let xml = r#"<rss><channel>
            <item><title>Nasdaq rally extends</title></item>
            <item><title>Treasury yields climb</title></item>
        </channel></rss>"#;
        let sources: Vec<Arc<dyn FeedSource>> = vec![
            Arc::new(FixtureFeed::new("ok", xml)),
            Arc::new(FailingFeed::new("down")),
        ];
        let items = fetch_all(&sources).await;
        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.source == "ok"));
    }

    #[tokio::test]
    async fn no_sources_yields_empty_batch() {
        assert!(fetch_all(&[]).await.is_empty());
    }
}
