// tests/config_shipped.rs
use std::path::Path;

use vix_sentiment::config::{defaults, EngineConfig, TransportKind};

fn shipped() -> EngineConfig {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/sentiment.toml");
    EngineConfig::from_path(&path).expect("shipped config parses")
}

#[test]
fn shipped_config_validates() {
    let cfg = shipped();
    cfg.validate().expect("shipped config is valid");
    assert!(vix_sentiment::SentimentEngine::from_config(&cfg).is_ok());
}

#[test]
fn shipped_config_matches_builtin_tuning() {
    let cfg = shipped();
    let builtin = EngineConfig::default();

    assert_eq!(cfg.keywords, defaults::keywords());
    assert_eq!(cfg.feeds, defaults::feeds());
    assert_eq!(cfg.scoring.relevance_pattern, builtin.scoring.relevance_pattern);
    assert_eq!(cfg.scoring.urgency_pattern, builtin.scoring.urgency_pattern);
    assert_eq!(cfg.bands, builtin.bands);
    assert_eq!(cfg.decay.steps, builtin.decay.steps);
    assert_eq!(cfg.retention.display_limit, 40);
    assert_eq!(
        cfg.refresh.transports,
        vec![TransportKind::Direct, TransportKind::AllOrigins, TransportKind::Prefix]
    );
    assert!(cfg.aggregation.session_boost.is_none());
}
