// src/relevance.rs
//! Relevance gate: one case-insensitive regex over `title + " " + description`.
//!
//! Items that fail the gate are dropped before scoring and never reach the
//! aggregator, the retention store or the UI.

use anyhow::{Context, Result};
use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    re: Regex,
}

impl RelevanceFilter {
    pub fn new(pattern: &str) -> Result<Self> {
        let re = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .with_context(|| format!("relevance pattern `{pattern}`"))?;
        Ok(Self { re })
    }

    /// `text` is expected to be the lower-cased title + description; matching
    /// is case-insensitive regardless.
    pub fn is_relevant(&self, text: &str) -> bool {
        self.re.is_match(text)
    }

    /// Convenience for raw fields; a missing description is just empty.
    pub fn is_relevant_item(&self, title: &str, description: &str) -> bool {
        self.is_relevant(&combined_text(title, description))
    }
}

/// Lower-cased `title + " " + description`, the text every rule runs against.
pub fn combined_text(title: &str, description: &str) -> String {
    let mut s = String::with_capacity(title.len() + description.len() + 1);
    s.push_str(title);
    s.push(' ');
    s.push_str(description);
    s.to_lowercase()
}
