//! Keyword rule table: weight buckets of case-insensitive regex patterns.
//!
//! Compiled once from config at startup and immutable afterwards. Every
//! matching pattern contributes its rule's weight, so a rule with three
//! patterns can add its weight up to three times for one headline.

use anyhow::{bail, Context, Result};
use regex::{Regex, RegexBuilder};

use crate::config::KeywordRuleCfg;

/// One weight bucket. Weights need not be unique across rules.
#[derive(Debug, Clone)]
pub struct KeywordRule {
    pub weight: i32,
    pub patterns: Vec<Regex>,
}

/// A single pattern hit, kept for explainability in the API preview.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RuleHit {
    pub weight: i32,
    pub pattern: String,
}

#[derive(Debug, Clone)]
pub struct KeywordTable {
    rules: Vec<KeywordRule>,
}

impl KeywordTable {
    /// Compile the configured rules. An empty table, a rule without patterns,
    /// or an invalid regex is a startup error.
    pub fn compile(cfg: &[KeywordRuleCfg]) -> Result<Self> {
        if cfg.is_empty() {
            bail!("keyword table is empty");
        }
        let rules = cfg
            .iter()
            .map(|r| {
                if r.patterns.is_empty() {
                    bail!("keyword rule with weight {} has no patterns", r.weight);
                }
                let patterns = r
                    .patterns
                    .iter()
                    .map(|p| {
                        RegexBuilder::new(p)
                            .case_insensitive(true)
                            .build()
                            .with_context(|| format!("keyword pattern `{p}` (weight {})", r.weight))
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(KeywordRule {
                    weight: r.weight,
                    patterns,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[KeywordRule] {
        &self.rules
    }

    /// Sum of weights over every matching pattern of every rule.
    pub fn score(&self, text: &str) -> i32 {
        self.rules
            .iter()
            .flat_map(|r| r.patterns.iter().map(move |p| (r.weight, p)))
            .filter(|(_, p)| p.is_match(text))
            .map(|(w, _)| w)
            .sum()
    }

    /// Same walk as [`score`](Self::score) but returning the individual hits.
    pub fn hits(&self, text: &str) -> Vec<RuleHit> {
        let mut out = Vec::new();
        for r in &self.rules {
            for p in &r.patterns {
                if p.is_match(text) {
                    out.push(RuleHit {
                        weight: r.weight,
                        pattern: p.as_str().to_string(),
                    });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(weight: i32, patterns: &[&str]) -> KeywordRuleCfg {
        KeywordRuleCfg {
            weight,
            patterns: patterns.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn distinct_rules_add_up() {
        let t = KeywordTable::compile(&[rule(-3, &[r"\bwar\b"]), rule(2, &["rally"])]).unwrap();
        assert_eq!(t.score("stocks rally despite war fears"), -1);
    }

    #[test]
    fn every_matching_pattern_counts() {
        let t = KeywordTable::compile(&[rule(-5, &["crash", "plunge"])]).unwrap();
        assert_eq!(t.score("markets crash and plunge"), -10);
        assert_eq!(t.hits("markets crash and plunge").len(), 2);
    }

    #[test]
    fn shared_weight_buckets_are_independent() {
        let t = KeywordTable::compile(&[rule(2, &["rally"]), rule(2, &["risk-?on"])]).unwrap();
        assert_eq!(t.score("risk-on rally"), 4);
    }

    #[test]
    fn matching_is_case_insensitive() {
        let t = KeywordTable::compile(&[rule(-6, &["circuit.?breaker"])]).unwrap();
        assert_eq!(t.score("CIRCUIT BREAKER triggered"), -6);
    }

    #[test]
    fn invalid_tables_are_rejected() {
        assert!(KeywordTable::compile(&[]).is_err());
        assert!(KeywordTable::compile(&[rule(1, &[])]).is_err());
        let err = KeywordTable::compile(&[rule(1, &["(unclosed"])]).unwrap_err();
        assert!(format!("{err:#}").contains("(unclosed"));
    }

    #[test]
    fn built_in_table_compiles() {
        let t = KeywordTable::compile(&crate::config::defaults::keywords()).unwrap();
        assert_eq!(t.rules().len(), 10);
        // "award" must not trip the war rule
        assert_eq!(t.score("local bakery wins award"), 0);
    }
}
