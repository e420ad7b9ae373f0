//! OAuth2 access tokens for Google Cloud APIs from a service-account key file.

pub mod authenticator;
pub mod credentials;
pub mod error;

pub use authenticator::{Authenticator, CLOUD_PLATFORM_SCOPE};
pub use credentials::ServiceAccountKey;
pub use error::AuthError;
