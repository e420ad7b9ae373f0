use thiserror::Error;

/// Errors raised while loading credentials or obtaining an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to read credentials file {path}: {source}")]
    ReadCredentials {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("credentials file {path} is not a valid service-account key: {source}")]
    ParseCredentials {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to sign token assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint answered with a non-2xx status.
    #[error("token endpoint returned {status}: {body}")]
    TokenRejected { status: u16, body: String },
}
