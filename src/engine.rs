//! # Sentiment Engine
//! One refresh cycle as a pure state transition:
//! daily reset → relevance gate → cutoff → in-cycle dedup → score →
//! fold into the rolling score → retain → classify → alert gate.
//!
//! No I/O here; the cycle runner in `ingest::scheduler` fetches, calls
//! [`SentimentEngine::run_cycle`] and persists.

use std::collections::HashSet;

use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, Utc};
use metrics::{counter, gauge};
use serde::Serialize;

use crate::alert::{Alert, AlertGate};
use crate::analyze::{HeadlineScorer, ScoreBreakdown, ScoredItem};
use crate::config::EngineConfig;
use crate::ingest::types::NewsItem;
use crate::relevance::RelevanceFilter;
use crate::rolling::{Aggregate, Aggregator, RollingScore};
use crate::sentiment::{Bands, Sentiment, SentimentState, Severity};
use crate::store::{NewsStore, PersistedNews};

/// Local calendar date used for the daily reset.
pub fn today_local(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}

#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub at: DateTime<Utc>,
    pub fetched: usize,
    pub irrelevant: usize,
    pub expired: usize,
    pub duplicates: usize,
    pub scored: usize,
    pub new_items: usize,
    pub daily_reset: bool,
    pub aggregate: Aggregate,
    pub sentiment: Sentiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert: Option<Alert>,
}

/// Body of `GET /sentiment`.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentSnapshot {
    pub state: SentimentState,
    pub label: &'static str,
    pub rolling_score: f64,
    pub effective_score: f64,
    pub raw_cycle_score: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Retained item as listed by `GET /news`.
#[derive(Debug, Clone, Serialize)]
pub struct NewsView {
    #[serde(flatten)]
    pub item: ScoredItem,
    pub severity: Severity,
}

/// Body of `POST /score`.
#[derive(Debug, Clone, Serialize)]
pub struct ScorePreview {
    pub relevant: bool,
    #[serde(flatten)]
    pub breakdown: ScoreBreakdown,
}

#[derive(Debug, Clone)]
pub struct SentimentEngine {
    filter: RelevanceFilter,
    scorer: HeadlineScorer,
    aggregator: Aggregator,
    bands: Bands,
    rolling: RollingScore,
    store: NewsStore,
    alerts: AlertGate,
    display_limit: usize,
    reset_rolling_daily: bool,
    last: Option<CycleReport>,
}

impl SentimentEngine {
    pub fn from_config(cfg: &EngineConfig) -> Result<Self> {
        cfg.validate()?;
        Ok(Self {
            filter: RelevanceFilter::new(&cfg.scoring.relevance_pattern)?,
            scorer: HeadlineScorer::from_config(cfg)?,
            aggregator: Aggregator::from_cfg(&cfg.aggregation)?,
            bands: Bands::from_cfg(&cfg.bands),
            rolling: RollingScore::new(),
            store: NewsStore::from_cfg(&cfg.retention)?,
            alerts: AlertGate::new(cfg.alert.cooldown_secs),
            display_limit: cfg.retention.display_limit,
            reset_rolling_daily: cfg.retention.reset_rolling_daily,
            last: None,
        })
    }

    /// Run one cycle over a complete fetch batch.
    pub fn run_cycle(&mut self, items: Vec<NewsItem>, now: DateTime<Utc>, today: NaiveDate) -> CycleReport {
        let daily_reset = self.store.reset_if_new_day(today);
        if daily_reset {
            if self.reset_rolling_daily {
                self.rolling.reset();
            }
            tracing::info!(target: "engine", %today, rolling_reset = self.reset_rolling_daily, "daily reset of retained news");
        }

        let fetched = items.len();
        let mut irrelevant = 0usize;
        let mut expired = 0usize;
        let mut duplicates = 0usize;
        let mut seen: HashSet<String> = HashSet::with_capacity(fetched);
        let mut scored: Vec<ScoredItem> = Vec::with_capacity(fetched);

        for item in &items {
            if !self.filter.is_relevant_item(&item.title, &item.description) {
                irrelevant += 1;
                continue;
            }
            if self.scorer.is_expired(item, now) {
                expired += 1;
                continue;
            }
            if !seen.insert(item.title.clone()) {
                duplicates += 1;
                continue;
            }
            scored.push(self.scorer.score(item, now));
        }

        let aggregate = self.aggregator.aggregate(&mut self.rolling, &scored, now);
        let scored_len = scored.len();
        let new_items = self.store.append(scored, now);
        let sentiment = self.bands.classify(aggregate.effective);
        let alert = self.alerts.observe(sentiment.state, aggregate.effective, now);

        counter!("sentiment_cycles_total").increment(1);
        counter!("items_irrelevant_total").increment(irrelevant as u64);
        counter!("items_expired_total").increment(expired as u64);
        counter!("items_new_total").increment(new_items as u64);
        gauge!("sentiment_rolling_score").set(aggregate.rolling);
        gauge!("sentiment_effective_score").set(aggregate.effective);
        gauge!("sentiment_raw_cycle_score").set(aggregate.raw_cycle_score);
        gauge!("sentiment_state").set(f64::from(sentiment.state.ordinal()));

        tracing::info!(
            target: "engine",
            fetched,
            irrelevant,
            expired,
            duplicates,
            scored = scored_len,
            new_items,
            raw = aggregate.raw_cycle_score,
            rolling = aggregate.rolling,
            effective = aggregate.effective,
            cold_start = aggregate.cold_start,
            state = sentiment.state.as_str(),
            "cycle complete"
        );

        let report = CycleReport {
            at: now,
            fetched,
            irrelevant,
            expired,
            duplicates,
            scored: scored_len,
            new_items,
            daily_reset,
            aggregate,
            sentiment,
            alert,
        };
        self.last = Some(report.clone());
        report
    }

    pub fn sentiment_at(&self, now: DateTime<Utc>) -> Sentiment {
        self.bands
            .classify(self.aggregator.effective(&self.rolling, now))
    }

    pub fn snapshot(&self, now: DateTime<Utc>) -> SentimentSnapshot {
        let effective = self.aggregator.effective(&self.rolling, now);
        let sentiment = self.bands.classify(effective);
        SentimentSnapshot {
            state: sentiment.state,
            label: sentiment.label,
            rolling_score: self.rolling.value(),
            effective_score: effective,
            raw_cycle_score: self
                .last
                .as_ref()
                .map(|r| r.aggregate.raw_cycle_score)
                .unwrap_or(0.0),
            updated_at: self.last.as_ref().map(|r| r.at),
        }
    }

    /// Newest-first retained items; `limit` is capped by the display limit.
    pub fn news(&self, limit: Option<usize>, now: DateTime<Utc>) -> Vec<NewsView> {
        let limit = limit
            .unwrap_or(self.display_limit)
            .min(self.display_limit);
        self.store
            .list_recent(limit, self.store.max_age(), now)
            .into_iter()
            .map(|item| NewsView {
                severity: item.severity(),
                item,
            })
            .collect()
    }

    /// Score one headline without touching any state.
    pub fn preview(&self, item: &NewsItem, now: DateTime<Utc>) -> ScorePreview {
        ScorePreview {
            relevant: self
                .filter
                .is_relevant_item(&item.title, &item.description),
            breakdown: self.scorer.breakdown(item, now),
        }
    }

    pub fn restore(&mut self, doc: PersistedNews) {
        self.store.restore(doc);
    }

    pub fn persisted(&self) -> PersistedNews {
        self.store.to_persisted()
    }

    pub fn rolling(&self) -> RollingScore {
        self.rolling
    }

    pub fn store(&self) -> &NewsStore {
        &self.store
    }

    pub fn last_report(&self) -> Option<&CycleReport> {
        self.last.as_ref()
    }
}
