use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BigQueryError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(#[from] vizbq_auth::AuthError),

    #[error("staging file {}: {source}", .path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode {context}: {source}")]
    Encode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// The job finished with an `errorResult`.
    #[error("load job {job_id} failed ({reason}): {message}")]
    LoadFailed {
        job_id: String,
        reason: String,
        message: String,
        details: Vec<String>,
    },

    #[error("load job {job_id} still {state} after {waited_secs}s")]
    LoadTimeout {
        job_id: String,
        state: String,
        waited_secs: u64,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
