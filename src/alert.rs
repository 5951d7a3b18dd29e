//! State-change alert gate.
//!
//! Fires when the classified band changes. Within the cooldown window only a
//! direction flip (risk-off ↔ risk-on) gets through; drifting into or out of
//! neutral, or between two bands on the same side, is suppressed.
//! The first observed state is the baseline and never alerts.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::sentiment::SentimentState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Alert {
    pub from: SentimentState,
    pub to: SentimentState,
    pub label: &'static str,
    pub score: f64,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct AlertGate {
    cooldown: Duration,
    last_state: Option<SentimentState>,
    last_alert_at: Option<DateTime<Utc>>,
    last_alert_state: Option<SentimentState>,
}

impl AlertGate {
    pub fn new(cooldown_secs: i64) -> Self {
        Self {
            cooldown: Duration::try_seconds(cooldown_secs.max(0)).unwrap_or(Duration::MAX),
            last_state: None,
            last_alert_at: None,
            last_alert_state: None,
        }
    }

    /// Returns true if a change to `new_state` at `now` may alert.
    pub fn should_alert(&self, new_state: SentimentState, now: DateTime<Utc>) -> bool {
        match (self.last_alert_at, self.last_alert_state) {
            (Some(last_at), Some(last_state)) => {
                if now.signed_duration_since(last_at) >= self.cooldown {
                    return true;
                }
                (last_state.is_risk_off() && new_state.is_risk_on())
                    || (last_state.is_risk_on() && new_state.is_risk_off())
            }
            _ => true,
        }
    }

    pub fn record_alert(&mut self, state: SentimentState, now: DateTime<Utc>) {
        self.last_alert_state = Some(state);
        self.last_alert_at = Some(now);
    }

    /// Feed one classification. Returns the alert if one fired.
    pub fn observe(&mut self, state: SentimentState, score: f64, now: DateTime<Utc>) -> Option<Alert> {
        let prev = self.last_state.replace(state)?;
        if prev == state {
            return None;
        }
        if !self.should_alert(state, now) {
            tracing::debug!(target: "alert", from = prev.as_str(), to = state.as_str(), "state change suppressed by cooldown");
            return None;
        }
        self.record_alert(state, now);
        tracing::warn!(
            target: "alert",
            from = prev.as_str(),
            to = state.as_str(),
            score,
            label = state.label(),
            "sentiment state changed"
        );
        Some(Alert {
            from: prev,
            to: state,
            label: state.label(),
            score,
            at: now,
        })
    }
}
