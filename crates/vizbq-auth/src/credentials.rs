use std::path::Path;

use serde::Deserialize;

use crate::error::AuthError;

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// The fields of a Google service-account JSON key that token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"[redacted]")
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Reads and parses a service-account key file.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ReadCredentials`] if the file cannot be read and
    /// [`AuthError::ParseCredentials`] if it is not a service-account key.
    pub fn from_file(path: &Path) -> Result<Self, AuthError> {
        let raw = std::fs::read_to_string(path).map_err(|e| AuthError::ReadCredentials {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_json(&raw).map_err(|e| AuthError::ParseCredentials {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Parses a service-account key from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns the underlying `serde_json` error if required fields are missing.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
