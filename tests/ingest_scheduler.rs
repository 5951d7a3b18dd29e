// tests/ingest_scheduler.rs
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Notify;

use vix_sentiment::config::EngineConfig;
use vix_sentiment::engine::SentimentEngine;
use vix_sentiment::ingest::scheduler::{spawn_scheduler, CycleRunner};
use vix_sentiment::ingest::types::{FeedSource, NewsItem};
use vix_sentiment::store::MemoryPersistence;

/// Counts fetches; optionally parks until released.
struct CountingFeed {
    calls: AtomicUsize,
    park: Option<Notify>,
    entered: Notify,
}

impl CountingFeed {
    fn new(park: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            park: park.then(Notify::new),
            entered: Notify::new(),
        }
    }
}

#[async_trait::async_trait]
impl FeedSource for CountingFeed {
    async fn fetch(&self) -> anyhow::Result<Vec<NewsItem>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        if let Some(p) = &self.park {
            p.notified().await;
        }
        Ok(vec![NewsItem {
            title: "Dow futures slip as yields rise".into(),
            description: String::new(),
            published_at: Some(Utc::now()),
            source: "count".into(),
            link: None,
        }])
    }

    fn id(&self) -> &str {
        "count"
    }
}

fn runner_with(feed: Arc<CountingFeed>) -> Arc<CycleRunner> {
    let engine = SentimentEngine::from_config(&EngineConfig::default()).unwrap();
    Arc::new(CycleRunner::new(
        engine,
        vec![feed as Arc<dyn FeedSource>],
        Arc::new(MemoryPersistence::new()),
    ))
}

#[tokio::test]
async fn overlapping_trigger_is_skipped_not_queued() {
    let feed = Arc::new(CountingFeed::new(true));
    let runner = runner_with(feed.clone());

    let r = runner.clone();
    let first = tokio::spawn(async move { r.try_run_cycle().await });
    tokio::time::timeout(Duration::from_secs(5), feed.entered.notified())
        .await
        .expect("first cycle started");

    assert!(runner.try_run_cycle().await.is_none());
    assert!(runner.try_run_cycle().await.is_none());

    if let Some(p) = &feed.park {
        p.notify_one();
    }
    assert!(first.await.unwrap().is_some());
    assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn scheduler_runs_first_cycle_immediately() {
    let feed = Arc::new(CountingFeed::new(false));
    let runner = runner_with(feed.clone());

    let handle = spawn_scheduler(runner.clone(), Duration::from_secs(3600));
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while runner.last_report().await.is_none() {
        assert!(tokio::time::Instant::now() < deadline, "no cycle ran");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    handle.abort();

    assert_eq!(feed.calls.load(Ordering::SeqCst), 1);
    assert_eq!(runner.news(None).await.len(), 1);
}
