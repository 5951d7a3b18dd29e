//! Headline scorer: keyword table → urgency booster → time decay.
//!
//! `score(item, now)` is pure: same item and same `now` give the same
//! [`ScoredItem`]. Missing descriptions and dates degrade to "" and age 0.
//!
//! Urgency policy: a title matching the urgency pattern pushes a non-zero
//! score further in its own direction (`-negative_boost` / `+positive_boost`).
//! A score of exactly 0 is left alone so neutral text never gains a signal.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use super::decay::{age_minutes, DecayPolicy};
use super::rules::{KeywordTable, RuleHit};
use crate::config::{EngineConfig, ScoringCfg};
use crate::ingest::types::NewsItem;
use crate::relevance::combined_text;
use crate::sentiment::Severity;

/// A scored headline as it flows into the aggregator and the retention store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub title: String,
    #[serde(default)]
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    pub raw_score: i32,
    pub decayed_score: f64,
    /// Falls back to the scoring time when the feed gave no usable date.
    pub published_at: DateTime<Utc>,
    pub first_seen_at: DateTime<Utc>,
}

impl ScoredItem {
    pub fn severity(&self) -> Severity {
        Severity::from_score(self.decayed_score)
    }
}

#[derive(Debug, Clone)]
pub struct UrgencyBoost {
    re: Regex,
    negative: i32,
    positive: i32,
}

impl UrgencyBoost {
    pub fn new(pattern: &str, negative: i32, positive: i32) -> Result<Self> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("urgency pattern `{pattern}`"))?;
        Ok(Self {
            re,
            negative: negative.abs(),
            positive: positive.abs(),
        })
    }

    pub fn from_cfg(cfg: &ScoringCfg) -> Result<Self> {
        Self::new(&cfg.urgency_pattern, cfg.negative_boost, cfg.positive_boost)
    }

    pub fn is_urgent(&self, title: &str) -> bool {
        self.re.is_match(title)
    }

    pub fn apply(&self, title: &str, score: i32) -> i32 {
        if score == 0 || !self.is_urgent(title) {
            return score;
        }
        if score < 0 {
            score - self.negative
        } else {
            score + self.positive
        }
    }
}

/// Breakdown returned by the `/score` preview endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub hits: Vec<RuleHit>,
    pub urgent: bool,
    pub keyword_score: i32,
    pub raw_score: i32,
    pub age_minutes: f64,
    pub decay_multiplier: f64,
    pub decayed_score: f64,
    pub expired: bool,
    pub severity: Severity,
}

#[derive(Debug, Clone)]
pub struct HeadlineScorer {
    table: KeywordTable,
    urgency: UrgencyBoost,
    decay: DecayPolicy,
}

impl HeadlineScorer {
    pub fn new(table: KeywordTable, urgency: UrgencyBoost, decay: DecayPolicy) -> Self {
        Self {
            table,
            urgency,
            decay,
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Result<Self> {
        Ok(Self::new(
            KeywordTable::compile(&cfg.keywords)?,
            UrgencyBoost::from_cfg(&cfg.scoring)?,
            DecayPolicy::from_cfg(&cfg.decay),
        ))
    }

    /// Keyword sum plus urgency boost, before decay.
    pub fn raw_score(&self, title: &str, description: &str) -> i32 {
        let text = combined_text(title, description);
        let kw = self.table.score(&text);
        self.urgency.apply(title, kw)
    }

    pub fn is_expired(&self, item: &NewsItem, now: DateTime<Utc>) -> bool {
        self.decay
            .is_expired(age_minutes(item.published_at, now))
    }

    pub fn score(&self, item: &NewsItem, now: DateTime<Utc>) -> ScoredItem {
        let raw = self.raw_score(&item.title, &item.description);
        let mult = self.decay.multiplier(age_minutes(item.published_at, now));
        ScoredItem {
            title: item.title.clone(),
            source: item.source.clone(),
            link: item.link.clone(),
            raw_score: raw,
            decayed_score: raw as f64 * mult,
            published_at: item.published_at.unwrap_or(now),
            first_seen_at: now,
        }
    }

    pub fn breakdown(&self, item: &NewsItem, now: DateTime<Utc>) -> ScoreBreakdown {
        let text = combined_text(&item.title, &item.description);
        let keyword_score = self.table.score(&text);
        let raw_score = self.urgency.apply(&item.title, keyword_score);
        let age = age_minutes(item.published_at, now);
        let decay_multiplier = self.decay.multiplier(age);
        let decayed_score = raw_score as f64 * decay_multiplier;
        ScoreBreakdown {
            hits: self.table.hits(&text),
            urgent: self.urgency.is_urgent(&item.title),
            keyword_score,
            raw_score,
            age_minutes: age,
            decay_multiplier,
            decayed_score,
            expired: self.decay.is_expired(age),
            severity: Severity::from_score(decayed_score),
        }
    }
}
