// src/analyze/mod.rs
//! Headline analysis: keyword rule table, time decay and the scorer built on both.

pub mod decay;
pub mod rules;
pub mod scoring;

// Re-export convenient types.
pub use crate::analyze::decay::{age_minutes, DecayPolicy};
pub use crate::analyze::rules::{KeywordRule, KeywordTable, RuleHit};
pub use crate::analyze::scoring::{HeadlineScorer, ScoreBreakdown, ScoredItem, UrgencyBoost};
