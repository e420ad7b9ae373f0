//! Bearer-token source shared by the Vision, Storage and BigQuery clients.
//!
//! A service-account [`Authenticator`] signs an RS256 JWT assertion and trades
//! it at the key's `token_uri` for an access token (the OAuth2 JWT-bearer
//! grant). The token is kept in memory and reused until shortly before it
//! expires.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::credentials::ServiceAccountKey;
use crate::error::AuthError;

pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Tokens this close to expiry are refreshed instead of reused.
const EXPIRY_SLACK_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    /// Unix seconds.
    expires_at: i64,
}

impl CachedToken {
    fn is_fresh(&self, now: i64) -> bool {
        now + EXPIRY_SLACK_SECS < self.expires_at
    }
}

enum Source {
    Static(String),
    ServiceAccount {
        key: ServiceAccountKey,
        encoding_key: EncodingKey,
        client: Client,
    },
}

/// Produces `Authorization: Bearer` tokens.
pub struct Authenticator {
    source: Source,
    cached: Mutex<Option<CachedToken>>,
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.source {
            Source::Static(_) => "static",
            Source::ServiceAccount { .. } => "service_account",
        };
        f.debug_struct("Authenticator").field("source", &kind).finish()
    }
}

impl Authenticator {
    /// An authenticator that always hands out `token`. Used for pre-issued
    /// tokens and for tests against mock servers.
    #[must_use]
    pub fn with_static_token(token: impl Into<String>) -> Self {
        Self {
            source: Source::Static(token.into()),
            cached: Mutex::new(None),
        }
    }

    /// Loads a service-account key file and prepares the signing key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError`] if the file cannot be read or parsed, the private
    /// key is not valid RSA PEM, or the HTTP client cannot be built.
    pub fn from_service_account_file(path: &Path, timeout_secs: u64) -> Result<Self, AuthError> {
        let key = ServiceAccountKey::from_file(path)?;
        Self::from_service_account_key(key, timeout_secs)
    }

    /// Builds an authenticator from an already-parsed key.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Jwt`] if the private key is not valid RSA PEM, or
    /// [`AuthError::Http`] if the HTTP client cannot be built.
    pub fn from_service_account_key(
        key: ServiceAccountKey,
        timeout_secs: u64,
    ) -> Result<Self, AuthError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        tracing::debug!(client_email = %key.client_email, "loaded service-account credentials");
        Ok(Self {
            source: Source::ServiceAccount {
                key,
                encoding_key,
                client,
            },
            cached: Mutex::new(None),
        })
    }

    /// Returns a valid access token, exchanging a fresh assertion if the
    /// cached one is missing or about to expire.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Jwt`] if signing fails, [`AuthError::Http`] on
    /// network failure, and [`AuthError::TokenRejected`] if the token
    /// endpoint answers with a non-2xx status.
    pub async fn access_token(&self) -> Result<String, AuthError> {
        let (key, encoding_key, client) = match &self.source {
            Source::Static(token) => return Ok(token.clone()),
            Source::ServiceAccount {
                key,
                encoding_key,
                client,
            } => (key, encoding_key, client),
        };

        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let assertion = sign_assertion(key, encoding_key, now)?;
        let response = client
            .post(&key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", &assertion)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::TokenRejected {
                status: status.as_u16(),
                body,
            });
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!(expires_in = token.expires_in, "obtained access token");

        let fresh = CachedToken {
            value: token.access_token,
            expires_at: now + token.expires_in,
        };
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }
}

fn sign_assertion(
    key: &ServiceAccountKey,
    encoding_key: &EncodingKey,
    now: i64,
) -> Result<String, AuthError> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: CLOUD_PLATFORM_SCOPE,
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_LIFETIME_SECS,
    };
    Ok(encode(&Header::new(Algorithm::RS256), &claims, encoding_key)?)
}
