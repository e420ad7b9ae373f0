pub mod client;
pub mod error;
pub mod types;

pub use client::{object_uri, StorageClient};
pub use error::GcsError;
