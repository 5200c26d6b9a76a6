//! Integration tests for runtime configuration loading.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use safe_harbor_app::{
    AppConfig, AppError, AppShell, ConfigError, DECOY_URL_ENV, EXPORT_DIR_ENV,
    REDIRECT_DELAY_ENV,
};
use safe_harbor_privacy::{DEFAULT_DECOY_URL, InMemoryBrowsingContext, PrivacyError};

mod common;

fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
    let env: HashMap<String, String> = pairs
        .iter()
        .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
        .collect();
    AppConfig::from_lookup(|name| env.get(name).cloned())
}

#[test]
fn config_loading_tests_defaults_when_unset_or_blank() {
    let config = load(&[(DECOY_URL_ENV, "   ")]).expect("blank values keep defaults");
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.decoy_url, DEFAULT_DECOY_URL);
    assert_eq!(config.redirect_delay, Duration::from_millis(100));
    assert_eq!(config.export_dir, PathBuf::from("."));
}

#[test]
fn config_loading_tests_accepts_overrides() {
    let config = load(&[
        (DECOY_URL_ENV, "https://www.bbc.co.uk/weather"),
        (REDIRECT_DELAY_ENV, "250"),
        (EXPORT_DIR_ENV, "/tmp/downloads"),
    ])
    .expect("overrides should load");

    assert_eq!(config.decoy_url, "https://www.bbc.co.uk/weather");
    assert_eq!(config.redirect_delay, Duration::from_millis(250));
    assert_eq!(config.export_dir, PathBuf::from("/tmp/downloads"));
}

#[test]
fn config_loading_tests_rejects_plain_http_decoy() {
    let result = load(&[(DECOY_URL_ENV, "http://weather.gov")]);
    assert!(matches!(
        result,
        Err(ConfigError::Privacy(PrivacyError::InvalidDecoyUrl(_)))
    ));
}

#[test]
fn config_loading_tests_rejects_slow_or_garbled_delay() {
    assert!(matches!(
        load(&[(REDIRECT_DELAY_ENV, "1000")]),
        Err(ConfigError::Privacy(PrivacyError::RedirectDelayTooLong(_)))
    ));
    assert!(matches!(
        load(&[(REDIRECT_DELAY_ENV, "soon")]),
        Err(ConfigError::Invalid { name, .. }) if name == REDIRECT_DELAY_ENV
    ));
}

#[test]
fn config_loading_tests_shell_revalidates_hand_built_config() {
    let config = AppConfig {
        decoy_url: "ftp://weather.gov".to_string(),
        ..AppConfig::default()
    };
    let result = AppShell::new(
        &config,
        InMemoryBrowsingContext::new("/"),
        common::RecordingSink::default(),
        0,
    );
    assert!(matches!(result, Err(AppError::Privacy(_))));
}
