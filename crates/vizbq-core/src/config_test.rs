use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 60);
    assert_eq!(cfg.user_agent, "vizbq/0.1 (vision-annotations)");
    assert_eq!(cfg.max_concurrent_annotations, 1);
    assert_eq!(cfg.staging_dir, PathBuf::from("."));
    assert_eq!(cfg.load_poll_interval_ms, 1000);
    assert_eq!(cfg.load_timeout_secs, 600);
    assert!(!cfg.schema_autodetect);
    assert_eq!(cfg.vision_base_url, "https://vision.googleapis.com");
    assert_eq!(cfg.storage_base_url, "https://storage.googleapis.com");
    assert_eq!(cfg.bigquery_base_url, "https://bigquery.googleapis.com");
}

#[test]
fn request_timeout_override() {
    let mut map = HashMap::new();
    map.insert("VIZBQ_REQUEST_TIMEOUT_SECS", "15");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, 15);
}

#[test]
fn request_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("VIZBQ_REQUEST_TIMEOUT_SECS", "soon");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VIZBQ_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(VIZBQ_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn max_concurrent_annotations_override() {
    let mut map = HashMap::new();
    map.insert("VIZBQ_MAX_CONCURRENT_ANNOTATIONS", "8");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.max_concurrent_annotations, 8);
}

#[test]
fn max_concurrent_annotations_rejects_zero() {
    let mut map = HashMap::new();
    map.insert("VIZBQ_MAX_CONCURRENT_ANNOTATIONS", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VIZBQ_MAX_CONCURRENT_ANNOTATIONS"),
        "expected InvalidEnvVar(VIZBQ_MAX_CONCURRENT_ANNOTATIONS), got: {result:?}"
    );
}

#[test]
fn staging_dir_override() {
    let mut map = HashMap::new();
    map.insert("VIZBQ_STAGING_DIR", "/tmp/vizbq");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.staging_dir, PathBuf::from("/tmp/vizbq"));
}

#[test]
fn schema_autodetect_accepts_common_spellings() {
    for (raw, expected) in [("true", true), ("YES", true), ("1", true), ("no", false)] {
        let mut map = HashMap::new();
        map.insert("VIZBQ_SCHEMA_AUTODETECT", raw);
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.schema_autodetect, expected, "input {raw}");
    }
}

#[test]
fn schema_autodetect_invalid() {
    let mut map = HashMap::new();
    map.insert("VIZBQ_SCHEMA_AUTODETECT", "maybe");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VIZBQ_SCHEMA_AUTODETECT"),
        "expected InvalidEnvVar(VIZBQ_SCHEMA_AUTODETECT), got: {result:?}"
    );
}

#[test]
fn base_url_overrides() {
    let mut map = HashMap::new();
    map.insert("VIZBQ_VISION_BASE_URL", "http://127.0.0.1:9001");
    map.insert("VIZBQ_STORAGE_BASE_URL", "http://127.0.0.1:9002");
    map.insert("VIZBQ_BIGQUERY_BASE_URL", "http://127.0.0.1:9003");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.vision_base_url, "http://127.0.0.1:9001");
    assert_eq!(cfg.storage_base_url, "http://127.0.0.1:9002");
    assert_eq!(cfg.bigquery_base_url, "http://127.0.0.1:9003");
}

#[test]
fn load_poll_interval_invalid() {
    let mut map = HashMap::new();
    map.insert("VIZBQ_LOAD_POLL_INTERVAL_MS", "-5");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "VIZBQ_LOAD_POLL_INTERVAL_MS"),
        "expected InvalidEnvVar(VIZBQ_LOAD_POLL_INTERVAL_MS), got: {result:?}"
    );
}

#[test]
fn only_unparseable_values_are_errors() {
    let parsed = [
        "VIZBQ_REQUEST_TIMEOUT_SECS",
        "VIZBQ_MAX_CONCURRENT_ANNOTATIONS",
        "VIZBQ_LOAD_POLL_INTERVAL_MS",
        "VIZBQ_LOAD_TIMEOUT_SECS",
        "VIZBQ_SCHEMA_AUTODETECT",
    ];
    for var in parsed {
        let map = HashMap::from([(var, "not-a-value")]);
        match build_app_config(lookup_from_map(&map)) {
            Err(ConfigError::InvalidEnvVar { var: reported, .. }) => assert_eq!(reported, var),
            other => panic!("expected InvalidEnvVar for {var}, got {other:?}"),
        }
    }

    // Any other unset or free-form variable falls back to its default.
    let map = HashMap::from([("VIZBQ_LOG_LEVEL", "debug"), ("VIZBQ_USER_AGENT", "")]);
    assert!(build_app_config(lookup_from_map(&map)).is_ok());
}
