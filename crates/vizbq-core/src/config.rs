use std::path::PathBuf;

use crate::app_config::{
    AppConfig, DEFAULT_BIGQUERY_BASE_URL, DEFAULT_STORAGE_BASE_URL, DEFAULT_VISION_BASE_URL,
};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but cannot be parsed.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so tests can drive it with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_bool = |var: &str, default: &str| -> Result<bool, ConfigError> {
        parse_flag(&or_default(var, default)).ok_or_else(|| {
            invalid(
                var,
                "expected one of true, false, 1, 0, yes, no".to_string(),
            )
        })
    };

    let log_level = or_default("VIZBQ_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("VIZBQ_REQUEST_TIMEOUT_SECS", "60")?;
    let user_agent = or_default("VIZBQ_USER_AGENT", "vizbq/0.1 (vision-annotations)");

    let max_concurrent_annotations = parse_usize("VIZBQ_MAX_CONCURRENT_ANNOTATIONS", "1")?;
    if max_concurrent_annotations == 0 {
        return Err(invalid(
            "VIZBQ_MAX_CONCURRENT_ANNOTATIONS",
            "must be at least 1".to_string(),
        ));
    }

    let staging_dir = PathBuf::from(or_default("VIZBQ_STAGING_DIR", "."));
    let load_poll_interval_ms = parse_u64("VIZBQ_LOAD_POLL_INTERVAL_MS", "1000")?;
    let load_timeout_secs = parse_u64("VIZBQ_LOAD_TIMEOUT_SECS", "600")?;
    let schema_autodetect = parse_bool("VIZBQ_SCHEMA_AUTODETECT", "false")?;

    let vision_base_url = or_default("VIZBQ_VISION_BASE_URL", DEFAULT_VISION_BASE_URL);
    let storage_base_url = or_default("VIZBQ_STORAGE_BASE_URL", DEFAULT_STORAGE_BASE_URL);
    let bigquery_base_url = or_default("VIZBQ_BIGQUERY_BASE_URL", DEFAULT_BIGQUERY_BASE_URL);

    Ok(AppConfig {
        log_level,
        request_timeout_secs,
        user_agent,
        max_concurrent_annotations,
        staging_dir,
        load_poll_interval_ms,
        load_timeout_secs,
        schema_autodetect,
        vision_base_url,
        storage_base_url,
        bigquery_base_url,
    })
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
