use thiserror::Error;

#[derive(Debug, Error)]
pub enum VisionError {
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

    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// The request succeeded but the service reported a per-image error.
    #[error("annotation failed for {uri} (code {code}): {message}")]
    Annotation {
        uri: String,
        code: i32,
        message: String,
    },

    #[error("annotation service returned no response for {uri}")]
    EmptyResponse { uri: String },

    /// A bounding polygon did not have exactly four vertices.
    #[error("{category} bounding polygon has {found} vertices, expected 4")]
    MalformedPolygon {
        category: &'static str,
        found: usize,
    },

    #[error("invalid base URL \"{url}\": {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}
