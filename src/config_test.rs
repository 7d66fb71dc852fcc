use std::collections::HashMap;

use super::*;

fn config_from(pairs: &[(&str, &str)]) -> Result<GameConfig, ConfigError> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    GameConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn from_lookup_defaults() {
    let cfg = config_from(&[]).unwrap();
    assert_eq!(cfg, GameConfig::default());
    assert_eq!(cfg.round_secs, 16);
    assert_eq!(cfg.feedback_delay, Duration::from_secs(1));
    assert_eq!(cfg.choices, 4);
    assert_eq!(cfg.distractors(), 3);
    assert_eq!(cfg.provider_url, DEFAULT_PROVIDER_URL);
    assert_eq!(cfg.store_path, PathBuf::from(DEFAULT_STORE_PATH));
}

#[test]
fn from_lookup_parses_overrides() {
    let cfg = config_from(&[
        ("FLAGQUIZ_ROUND_SECS", "15"),
        ("FLAGQUIZ_FEEDBACK_MS", " 250 "),
        ("FLAGQUIZ_CHOICES", "6"),
        ("FLAGQUIZ_PROVIDER_URL", "https://example.test/v2/all"),
        ("FLAGQUIZ_STORE_PATH", "/tmp/scores.json"),
        ("FLAGQUIZ_REQUEST_TIMEOUT_SECS", "5"),
        ("FLAGQUIZ_CONNECT_TIMEOUT_SECS", "2"),
    ])
    .unwrap();

    assert_eq!(cfg.round_secs, 15);
    assert_eq!(cfg.feedback_delay, Duration::from_millis(250));
    assert_eq!(cfg.choices, 6);
    assert_eq!(cfg.distractors(), 5);
    assert_eq!(cfg.provider_url, "https://example.test/v2/all");
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/scores.json"));
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 5, connect_secs: 2 });
}

#[test]
fn from_lookup_blank_strings_fall_back() {
    let cfg = config_from(&[("FLAGQUIZ_PROVIDER_URL", "  "), ("FLAGQUIZ_STORE_PATH", "")]).unwrap();
    assert_eq!(cfg.provider_url, DEFAULT_PROVIDER_URL);
    assert_eq!(cfg.store_path, PathBuf::from(DEFAULT_STORE_PATH));
}

#[test]
fn from_lookup_rejects_garbage_number() {
    let err = config_from(&[("FLAGQUIZ_ROUND_SECS", "sixteen")]).unwrap_err();
    assert_eq!(err, ConfigError::Invalid { key: "FLAGQUIZ_ROUND_SECS", value: "sixteen".into() });
    assert!(err.to_string().contains("FLAGQUIZ_ROUND_SECS"));
}

#[test]
fn from_lookup_rejects_zero_round() {
    let err = config_from(&[("FLAGQUIZ_ROUND_SECS", "0")]).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { key: "FLAGQUIZ_ROUND_SECS", .. }));
}

#[test]
fn from_lookup_rejects_single_choice() {
    let err = config_from(&[("FLAGQUIZ_CHOICES", "1")]).unwrap_err();
    assert!(matches!(err, ConfigError::OutOfRange { key: "FLAGQUIZ_CHOICES", .. }));
}
