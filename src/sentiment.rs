//! Sentiment classifier: rolling score → discrete risk state with a label.
//!
//! Bands are checked from most extreme to least extreme, first match wins:
//! `<= extreme_negative`, `<= negative`, `>= extreme_positive`, `>= positive`,
//! otherwise neutral. With the default cuts (-14 / -8 / 8 / 14) that gives
//! crash mode, risk-off, melt-up, risk-on and chop.

use serde::{Deserialize, Serialize};

use crate::config::BandsCfg;

/// Ordered by bullishness: `ExtremeNegative < … < ExtremePositive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentimentState {
    ExtremeNegative,
    Negative,
    Neutral,
    Positive,
    ExtremePositive,
}

impl SentimentState {
    pub fn label(self) -> &'static str {
        match self {
            SentimentState::ExtremeNegative => "LONG VXX AGGRESSIVE - size up (crash mode)",
            SentimentState::Negative => "LONG VXX - clear risk-off",
            SentimentState::Neutral => "CHOPPY - wait or scalp micro",
            SentimentState::Positive => "SHORT VXX or flat - risk-on",
            SentimentState::ExtremePositive => "SHORT VXX AGGRESSIVE - melt-up",
        }
    }

    /// Stable band id for the UI.
    pub fn as_str(self) -> &'static str {
        match self {
            SentimentState::ExtremeNegative => "extreme-negative",
            SentimentState::Negative => "negative",
            SentimentState::Neutral => "neutral",
            SentimentState::Positive => "positive",
            SentimentState::ExtremePositive => "extreme-positive",
        }
    }

    /// -2..=2, handy for gauges.
    pub fn ordinal(self) -> i8 {
        match self {
            SentimentState::ExtremeNegative => -2,
            SentimentState::Negative => -1,
            SentimentState::Neutral => 0,
            SentimentState::Positive => 1,
            SentimentState::ExtremePositive => 2,
        }
    }

    pub fn is_risk_off(self) -> bool {
        matches!(self, SentimentState::ExtremeNegative | SentimentState::Negative)
    }

    pub fn is_risk_on(self) -> bool {
        matches!(self, SentimentState::Positive | SentimentState::ExtremePositive)
    }
}

/// What the status indicator shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sentiment {
    pub state: SentimentState,
    pub label: &'static str,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bands {
    extreme_negative: f64,
    negative: f64,
    positive: f64,
    extreme_positive: f64,
}

impl Bands {
    /// Expects validated cuts (`extreme_negative < negative < positive < extreme_positive`).
    pub fn from_cfg(cfg: &BandsCfg) -> Self {
        Self {
            extreme_negative: cfg.extreme_negative,
            negative: cfg.negative,
            positive: cfg.positive,
            extreme_positive: cfg.extreme_positive,
        }
    }

    /// Total over all inputs; NaN falls through to neutral.
    pub fn classify(&self, score: f64) -> Sentiment {
        let state = if score <= self.extreme_negative {
            SentimentState::ExtremeNegative
        } else if score <= self.negative {
            SentimentState::Negative
        } else if score >= self.extreme_positive {
            SentimentState::ExtremePositive
        } else if score >= self.positive {
            SentimentState::Positive
        } else {
            SentimentState::Neutral
        };
        Sentiment {
            state,
            label: state.label(),
            score,
        }
    }
}

impl Default for Bands {
    fn default() -> Self {
        Self::from_cfg(&BandsCfg::default())
    }
}

/// Per-headline colour tier for the feed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Severe,
    Elevated,
    Calm,
    Mild,
    Strong,
}

impl Severity {
    pub fn from_score(score: f64) -> Self {
        if score <= -3.0 {
            Severity::Severe
        } else if score <= -1.0 {
            Severity::Elevated
        } else if score >= 3.0 {
            Severity::Strong
        } else if score >= 1.0 {
            Severity::Mild
        } else {
            Severity::Calm
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cut_points() {
        let b = Bands::default();
        assert_eq!(b.classify(-14.0).state, SentimentState::ExtremeNegative);
        assert_eq!(b.classify(-13.9).state, SentimentState::Negative);
        assert_eq!(b.classify(-8.0).state, SentimentState::Negative);
        assert_eq!(b.classify(-7.9).state, SentimentState::Neutral);
        assert_eq!(b.classify(0.0).state, SentimentState::Neutral);
        assert_eq!(b.classify(7.9).state, SentimentState::Neutral);
        assert_eq!(b.classify(8.0).state, SentimentState::Positive);
        assert_eq!(b.classify(14.0).state, SentimentState::ExtremePositive);
    }

    #[test]
    fn integer_sweep_is_monotonic() {
        let b = Bands::default();
        let mut prev = SentimentState::ExtremeNegative;
        for s in -20..=20 {
            let cur = b.classify(s as f64).state;
            assert!(cur >= prev, "state went backwards at {s}: {prev:?} -> {cur:?}");
            prev = cur;
        }
        assert_eq!(prev, SentimentState::ExtremePositive);
    }

    #[test]
    fn nan_is_neutral() {
        assert_eq!(Bands::default().classify(f64::NAN).state, SentimentState::Neutral);
    }

    #[test]
    fn label_travels_with_state() {
        let s = Bands::default().classify(-20.0);
        assert_eq!(s.label, SentimentState::ExtremeNegative.label());
        assert!(s.state.is_risk_off());
        assert!(!s.state.is_risk_on());
    }

    #[test]
    fn severity_tiers() {
        assert_eq!(Severity::from_score(-6.0), Severity::Severe);
        assert_eq!(Severity::from_score(-1.0), Severity::Elevated);
        assert_eq!(Severity::from_score(0.4), Severity::Calm);
        assert_eq!(Severity::from_score(1.0), Severity::Mild);
        assert_eq!(Severity::from_score(3.5), Severity::Strong);
    }

    #[test]
    fn state_serializes_kebab_case() {
        let v = serde_json::to_value(SentimentState::ExtremeNegative).unwrap();
        assert_eq!(v, serde_json::json!("extreme-negative"));
    }
}
