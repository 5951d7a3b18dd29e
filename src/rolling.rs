//! # Rolling Score
//! Batch aggregation of per-cycle scores into one exponentially smoothed value.
//!
//! The rolling score is an explicit state object owned by the engine and
//! passed into [`Aggregator::aggregate`]; there is no process-wide global.
//! `0.0` is the "never initialized" sentinel: the first cycle that finds it
//! there sets the value to the raw cycle score instead of blending it in.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyze::ScoredItem;
use crate::config::{AggregationCfg, SessionBoostCfg};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RollingScore {
    value: f64,
}

impl RollingScore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(value: f64) -> Self {
        Self {
            value: if value.is_finite() { value } else { 0.0 },
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Still at the sentinel; the next fold is a cold start.
    pub fn is_cold(&self) -> bool {
        self.value == 0.0
    }

    pub fn reset(&mut self) {
        self.value = 0.0;
    }
}

/// Time-of-day multiplier (e.g. a pre-market window), applied after smoothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionBoost {
    start: NaiveTime,
    end: NaiveTime,
    factor: f64,
}

impl SessionBoost {
    pub fn new(start: NaiveTime, end: NaiveTime, factor: f64) -> Result<Self> {
        if !factor.is_finite() || factor <= 0.0 {
            bail!("session boost factor must be a positive number, got {factor}");
        }
        if start == end {
            bail!("session boost window is empty ({start} - {end})");
        }
        Ok(Self { start, end, factor })
    }

    pub fn from_cfg(cfg: &SessionBoostCfg) -> Result<Self> {
        Self::new(parse_hhmm(&cfg.start)?, parse_hhmm(&cfg.end)?, cfg.factor)
    }

    /// Factor in effect at `now` (UTC); 1.0 outside the window.
    pub fn factor_at(&self, now: DateTime<Utc>) -> f64 {
        let t = now.time();
        let inside = if self.start < self.end {
            t >= self.start && t < self.end
        } else {
            // window wraps midnight
            t >= self.start || t < self.end
        };
        if inside {
            self.factor
        } else {
            1.0
        }
    }
}

fn parse_hhmm(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M")
        .map_err(|e| anyhow!("invalid session time `{s}` (expected HH:MM): {e}"))
}

/// Outcome of one fold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregate {
    /// Sum of decayed scores of the cycle.
    pub raw_cycle_score: f64,
    /// Smoothed value, as stored in the state.
    pub rolling: f64,
    /// `rolling` times the session factor; this is what gets classified.
    pub effective: f64,
    pub cold_start: bool,
}

#[derive(Debug, Clone)]
pub struct Aggregator {
    alpha: f64,
    session: Option<SessionBoost>,
}

impl Aggregator {
    /// `alpha` must be in (0, 1]; config validation enforces it.
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            session: None,
        }
    }

    pub fn with_session_boost(mut self, boost: SessionBoost) -> Self {
        self.session = Some(boost);
        self
    }

    pub fn from_cfg(cfg: &AggregationCfg) -> Result<Self> {
        let mut agg = Self::new(cfg.alpha);
        if let Some(sb) = &cfg.session_boost {
            agg = agg.with_session_boost(SessionBoost::from_cfg(sb)?);
        }
        Ok(agg)
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn raw_cycle_score(items: &[ScoredItem]) -> f64 {
        items.iter().map(|it| it.decayed_score).sum()
    }

    /// Fold a raw cycle score into `state`; returns the new smoothed value.
    pub fn fold(&self, state: &mut RollingScore, raw_cycle_score: f64) -> f64 {
        debug_assert!(raw_cycle_score.is_finite(), "scorer emitted a non-finite score");
        let raw = if raw_cycle_score.is_finite() {
            raw_cycle_score
        } else {
            0.0
        };
        state.value = if state.is_cold() {
            raw
        } else {
            state.value * (1.0 - self.alpha) + raw * self.alpha
        };
        state.value
    }

    pub fn aggregate(
        &self,
        state: &mut RollingScore,
        items: &[ScoredItem],
        now: DateTime<Utc>,
    ) -> Aggregate {
        let cold_start = state.is_cold();
        let raw_cycle_score = Self::raw_cycle_score(items);
        let rolling = self.fold(state, raw_cycle_score);
        Aggregate {
            raw_cycle_score,
            rolling,
            effective: self.effective(state, now),
            cold_start,
        }
    }

    /// Session-adjusted view of the state; never written back.
    pub fn effective(&self, state: &RollingScore, now: DateTime<Utc>) -> f64 {
        let factor = self.session.map(|s| s.factor_at(now)).unwrap_or(1.0);
        state.value * factor
    }
}
