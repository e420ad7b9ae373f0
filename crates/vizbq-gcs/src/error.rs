use thiserror::Error;

#[derive(Debug, Error)]
pub enum GcsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("authentication failed: {0}")]
    Auth(#[from] vizbq_auth::AuthError),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("bucket not found: {bucket}")]
    BucketNotFound { bucket: String },

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// The service handed back a page token it had already issued.
    #[error("listing of {bucket} repeated page token {token}")]
    PaginationCycle { bucket: String, token: String },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
