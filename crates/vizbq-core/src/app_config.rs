use std::path::PathBuf;

pub const DEFAULT_VISION_BASE_URL: &str = "https://vision.googleapis.com";
pub const DEFAULT_STORAGE_BASE_URL: &str = "https://storage.googleapis.com";
pub const DEFAULT_BIGQUERY_BASE_URL: &str = "https://bigquery.googleapis.com";

/// Process-wide settings read from the environment.
///
/// Per-run parameters (project, bucket, dataset, credentials, write
/// disposition) live in [`crate::RunConfig`] instead.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Upper bound on in-flight annotation requests. `1` keeps the run
    /// strictly sequential.
    pub max_concurrent_annotations: usize,
    /// Directory that receives the `<table>.json` staging file.
    pub staging_dir: PathBuf,
    pub load_poll_interval_ms: u64,
    pub load_timeout_secs: u64,
    /// When `true` the load job asks BigQuery to infer the schema from the
    /// data instead of sending the fixed annotation schema.
    pub schema_autodetect: bool,
    pub vision_base_url: String,
    pub storage_base_url: String,
    pub bigquery_base_url: String,
}
