// src/config/mod.rs
//! Engine configuration: TOML file + env overrides, validated once at startup.
//!
//! Resolution order for the file:
//! 1) `$SENTIMENT_CONFIG_PATH` (must exist)
//! 2) `config/sentiment.toml` (optional)
//! 3) built-in defaults
//!
//! Every section is optional; omitted sections fall back to the built-in tuning.

pub mod defaults;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::rolling::SessionBoost;

pub const DEFAULT_CONFIG_PATH: &str = "config/sentiment.toml";
pub const ENV_CONFIG_PATH: &str = "SENTIMENT_CONFIG_PATH";
pub const ENV_ALPHA: &str = "SENTIMENT_ALPHA";
pub const ENV_REFRESH_INTERVAL: &str = "REFRESH_INTERVAL_SECS";

/// Upper bounds for duration-like settings.
pub const MAX_RETENTION_HOURS: u64 = 24 * 366;
pub const MAX_ALERT_COOLDOWN_SECS: i64 = 7 * 24 * 3600;
pub const MAX_REFRESH_INTERVAL_SECS: u64 = 24 * 3600;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringCfg,
    pub decay: DecayCfg,
    pub aggregation: AggregationCfg,
    pub bands: BandsCfg,
    pub retention: RetentionCfg,
    pub refresh: RefreshCfg,
    pub alert: AlertCfg,
    pub feeds: Vec<FeedCfg>,
    pub keywords: Vec<KeywordRuleCfg>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringCfg::default(),
            decay: DecayCfg::default(),
            aggregation: AggregationCfg::default(),
            bands: BandsCfg::default(),
            retention: RetentionCfg::default(),
            refresh: RefreshCfg::default(),
            alert: AlertCfg::default(),
            feeds: defaults::feeds(),
            keywords: defaults::keywords(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringCfg {
    /// Single regex gating which items get scored at all.
    pub relevance_pattern: String,
    /// Matched against the title only.
    pub urgency_pattern: String,
    /// Magnitude subtracted from an already negative score.
    pub negative_boost: i32,
    /// Magnitude added to an already positive score.
    pub positive_boost: i32,
}

impl Default for ScoringCfg {
    fn default() -> Self {
        Self {
            relevance_pattern: defaults::RELEVANCE_PATTERN.to_string(),
            urgency_pattern: defaults::URGENCY_PATTERN.to_string(),
            negative_boost: 3,
            positive_boost: 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayStepCfg {
    /// Exclusive upper bound of the step, in minutes.
    pub max_age_minutes: f64,
    pub multiplier: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DecayCfg {
    pub steps: Vec<DecayStepCfg>,
    /// Multiplier past the last step.
    pub floor: f64,
    /// Items older than this are dropped instead of decayed. `0` disables the cutoff.
    pub cutoff_minutes: f64,
}

impl Default for DecayCfg {
    fn default() -> Self {
        Self {
            steps: vec![
                DecayStepCfg {
                    max_age_minutes: 20.0,
                    multiplier: 1.0,
                },
                DecayStepCfg {
                    max_age_minutes: 60.0,
                    multiplier: 0.7,
                },
                DecayStepCfg {
                    max_age_minutes: 180.0,
                    multiplier: 0.35,
                },
            ],
            floor: 0.1,
            cutoff_minutes: 24.0 * 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBoostCfg {
    /// "HH:MM", UTC, inclusive.
    pub start: String,
    /// "HH:MM", UTC, exclusive. A window with `end < start` wraps midnight.
    pub end: String,
    pub factor: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationCfg {
    pub alpha: f64,
    pub session_boost: Option<SessionBoostCfg>,
}

impl Default for AggregationCfg {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            session_boost: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandsCfg {
    pub extreme_negative: f64,
    pub negative: f64,
    pub positive: f64,
    pub extreme_positive: f64,
}

impl Default for BandsCfg {
    fn default() -> Self {
        Self {
            extreme_negative: -14.0,
            negative: -8.0,
            positive: 8.0,
            extreme_positive: 14.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionCfg {
    pub max_items: usize,
    pub max_age_hours: u64,
    /// How many items the UI feed shows.
    pub display_limit: usize,
    pub state_path: PathBuf,
    /// Also zero the rolling score at the local-midnight reset.
    pub reset_rolling_daily: bool,
}

impl Default for RetentionCfg {
    fn default() -> Self {
        Self {
            max_items: 200,
            max_age_hours: 24,
            display_limit: 40,
            state_path: PathBuf::from("state/news.json"),
            reset_rolling_daily: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Direct,
    AllOrigins,
    Prefix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshCfg {
    pub interval_secs: u64,
    pub timeout_secs: u64,
    /// Tried in order for every feed; first success wins.
    pub transports: Vec<TransportKind>,
}

impl Default for RefreshCfg {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            timeout_secs: 10,
            transports: vec![
                TransportKind::Direct,
                TransportKind::AllOrigins,
                TransportKind::Prefix,
            ],
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertCfg {
    pub cooldown_secs: i64,
}

impl Default for AlertCfg {
    fn default() -> Self {
        Self { cooldown_secs: 300 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCfg {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRuleCfg {
    pub weight: i32,
    pub patterns: Vec<String>,
}

impl EngineConfig {
    /// Resolve the file (env → default path → built-ins), apply env overrides, validate.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let path = PathBuf::from(p);
                if !path.exists() {
                    bail!("{ENV_CONFIG_PATH} points to non-existent path {}", path.display());
                }
                Self::from_path(&path)?
            }
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_path(&path)?
                } else {
                    tracing::info!(target: "config", "no config file found, using built-in defaults");
                    Self::default()
                }
            }
        };

        cfg.apply_env_overrides();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading sentiment config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing sentiment config {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: EngineConfig = toml::from_str(s)?;
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(a) = parse_alpha_env(std::env::var(ENV_ALPHA).ok()) {
            self.aggregation.alpha = a;
        }
        if let Some(secs) = parse_interval_env(std::env::var(ENV_REFRESH_INTERVAL).ok()) {
            self.refresh.interval_secs = secs;
        }
    }

    /// Reject configurations that would misbehave mid-run.
    /// Regex syntax is checked when the tables are compiled.
    pub fn validate(&self) -> Result<()> {
        let b = &self.bands;
        let cuts = [b.extreme_negative, b.negative, b.positive, b.extreme_positive];
        if cuts.iter().any(|c| !c.is_finite()) {
            bail!("band thresholds must be finite numbers");
        }
        if !(b.extreme_negative < b.negative
            && b.negative < b.positive
            && b.positive < b.extreme_positive)
        {
            bail!(
                "band thresholds must satisfy extreme_negative < negative < positive < extreme_positive (got {} / {} / {} / {})",
                b.extreme_negative,
                b.negative,
                b.positive,
                b.extreme_positive
            );
        }

        let alpha = self.aggregation.alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            bail!("aggregation.alpha must be in (0, 1], got {alpha}");
        }
        if let Some(sb) = &self.aggregation.session_boost {
            SessionBoost::from_cfg(sb)?;
        }

        if self.keywords.is_empty() {
            bail!("keyword table is empty");
        }
        for (i, rule) in self.keywords.iter().enumerate() {
            if rule.patterns.is_empty() {
                bail!("keyword rule #{i} (weight {}) has no patterns", rule.weight);
            }
        }
        if self.scoring.relevance_pattern.trim().is_empty() {
            bail!("scoring.relevance_pattern is empty");
        }
        if self.scoring.negative_boost < 0 || self.scoring.positive_boost < 0 {
            bail!("urgency boosts are magnitudes and must be >= 0");
        }

        self.validate_decay()?;

        if self.retention.max_items == 0 {
            bail!("retention.max_items must be > 0");
        }
        if self.retention.max_age_hours == 0 || self.retention.max_age_hours > MAX_RETENTION_HOURS {
            bail!(
                "retention.max_age_hours must be in 1..={MAX_RETENTION_HOURS}, got {}",
                self.retention.max_age_hours
            );
        }
        if !(0..=MAX_ALERT_COOLDOWN_SECS).contains(&self.alert.cooldown_secs) {
            bail!(
                "alert.cooldown_secs must be in 0..={MAX_ALERT_COOLDOWN_SECS}, got {}",
                self.alert.cooldown_secs
            );
        }
        if self.refresh.interval_secs == 0 || self.refresh.interval_secs > MAX_REFRESH_INTERVAL_SECS {
            bail!(
                "refresh.interval_secs must be in 1..={MAX_REFRESH_INTERVAL_SECS}, got {}",
                self.refresh.interval_secs
            );
        }
        if self.refresh.timeout_secs == 0 || self.refresh.timeout_secs > MAX_REFRESH_INTERVAL_SECS {
            bail!(
                "refresh.timeout_secs must be in 1..={MAX_REFRESH_INTERVAL_SECS}, got {}",
                self.refresh.timeout_secs
            );
        }
        if self.refresh.transports.is_empty() {
            bail!("refresh.transports must list at least one transport");
        }
        if self.feeds.is_empty() {
            tracing::warn!(target: "config", "no feeds configured; cycles will only decay the rolling score");
        }
        Ok(())
    }

    fn validate_decay(&self) -> Result<()> {
        let d = &self.decay;
        let mut prev_age = 0.0_f64;
        let mut prev_mult = f64::INFINITY;
        for s in &d.steps {
            if !s.max_age_minutes.is_finite() || s.max_age_minutes <= prev_age {
                return Err(anyhow!(
                    "decay steps must have strictly increasing, positive max_age_minutes"
                ));
            }
            if !(0.0..=1.0).contains(&s.multiplier) || s.multiplier > prev_mult {
                return Err(anyhow!(
                    "decay multipliers must lie in [0, 1] and be non-increasing"
                ));
            }
            prev_age = s.max_age_minutes;
            prev_mult = s.multiplier;
        }
        if !(0.0..=1.0).contains(&d.floor) || d.floor > prev_mult {
            bail!("decay.floor must lie in [0, 1] and not exceed the last step multiplier");
        }
        if !d.cutoff_minutes.is_finite() || d.cutoff_minutes < 0.0 {
            bail!("decay.cutoff_minutes must be >= 0");
        }
        Ok(())
    }
}

// parse optional alpha env; out-of-range or malformed values are ignored
fn parse_alpha_env(raw: Option<String>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| *v > 0.0 && *v <= 1.0)
}

fn parse_interval_env(raw: Option<String>) -> Option<u64> {
    raw.and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|v| *v > 0)
}
