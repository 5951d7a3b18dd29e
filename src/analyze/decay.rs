//! Age-based step decay for headline scores, with an optional hard cutoff.
//!
//! The default steps are `< 20 min → 1.0`, `< 60 → 0.7`, `< 180 → 0.35`,
//! anything older `0.1`, and items past 24 h are dropped entirely.

use chrono::{DateTime, Utc};

use crate::config::{DecayCfg, DecayStepCfg};

#[derive(Debug, Clone)]
pub struct DecayPolicy {
    steps: Vec<DecayStepCfg>,
    floor: f64,
    cutoff_minutes: Option<f64>,
}

impl DecayPolicy {
    /// Expects a config that already passed `EngineConfig::validate`.
    pub fn from_cfg(cfg: &DecayCfg) -> Self {
        Self {
            steps: cfg.steps.clone(),
            floor: cfg.floor,
            cutoff_minutes: (cfg.cutoff_minutes > 0.0).then_some(cfg.cutoff_minutes),
        }
    }

    /// Multiplier for an item `age_minutes` old. Negative ages count as fresh.
    pub fn multiplier(&self, age_minutes: f64) -> f64 {
        let age = sanitize_age(age_minutes);
        self.steps
            .iter()
            .find(|s| age < s.max_age_minutes)
            .map(|s| s.multiplier)
            .unwrap_or(self.floor)
    }

    /// True when the item is past the hard cutoff and must not be scored.
    pub fn is_expired(&self, age_minutes: f64) -> bool {
        match self.cutoff_minutes {
            Some(cut) => sanitize_age(age_minutes) > cut,
            None => false,
        }
    }
}

impl Default for DecayPolicy {
    fn default() -> Self {
        Self::from_cfg(&DecayCfg::default())
    }
}

/// Minutes between `published_at` and `now`. Missing dates are fresh (0).
pub fn age_minutes(published_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
    match published_at {
        Some(p) => sanitize_age(now.signed_duration_since(p).num_milliseconds() as f64 / 60_000.0),
        None => 0.0,
    }
}

fn sanitize_age(age: f64) -> f64 {
    if age.is_finite() && age > 0.0 {
        age
    } else {
        0.0
    }
}
