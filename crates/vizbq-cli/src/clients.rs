//! Builds the service clients from [`AppConfig`] and adapts them to the
//! pipeline's narrow traits.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use vizbq_auth::Authenticator;
use vizbq_bigquery::{BigQueryClient, BigQueryError, LoadSettings, LoadSummary, LoadTarget};
use vizbq_core::{AppConfig, NormalizedRecord};
use vizbq_gcs::{object_uri, GcsError, StorageClient};
use vizbq_vision::{AnnotateImageResponse, VisionClient, VisionError};

use crate::pipeline::{BatchLoader, ImageAnnotator, ObjectLister};

pub(crate) fn authenticator(
    config: &AppConfig,
    credentials_path: &Path,
) -> anyhow::Result<Arc<Authenticator>> {
    let auth = Authenticator::from_service_account_file(credentials_path, config.request_timeout_secs)
        .with_context(|| format!("loading credentials from {}", credentials_path.display()))?;
    Ok(Arc::new(auth))
}

pub(crate) fn storage_client(
    config: &AppConfig,
    auth: Arc<Authenticator>,
) -> anyhow::Result<StorageClient> {
    Ok(StorageClient::with_base_url(
        auth,
        config.request_timeout_secs,
        &config.user_agent,
        &config.storage_base_url,
    )?)
}

pub(crate) fn vision_client(
    config: &AppConfig,
    auth: Arc<Authenticator>,
) -> anyhow::Result<VisionClient> {
    Ok(VisionClient::with_base_url(
        auth,
        config.request_timeout_secs,
        &config.user_agent,
        &config.vision_base_url,
    )?)
}

pub(crate) fn bigquery_client(
    config: &AppConfig,
    auth: Arc<Authenticator>,
) -> anyhow::Result<BigQueryClient> {
    let settings = LoadSettings {
        staging_dir: config.staging_dir.clone(),
        poll_interval: Duration::from_millis(config.load_poll_interval_ms),
        load_timeout: Duration::from_secs(config.load_timeout_secs),
    };
    Ok(BigQueryClient::with_base_url(
        auth,
        config.request_timeout_secs,
        &config.user_agent,
        settings,
        &config.bigquery_base_url,
    )?)
}

impl ObjectLister for StorageClient {
    async fn list_image_uris(&self, bucket: &str) -> Result<Vec<String>, GcsError> {
        let names = self.list_object_names(bucket).await?;
        Ok(names.iter().map(|name| object_uri(bucket, name)).collect())
    }
}

impl ImageAnnotator for VisionClient {
    async fn annotate(&self, image_uri: &str) -> Result<AnnotateImageResponse, VisionError> {
        self.annotate_image(image_uri).await
    }
}

impl BatchLoader for BigQueryClient {
    async fn load(
        &self,
        target: &LoadTarget,
        records: &[NormalizedRecord],
    ) -> Result<LoadSummary, BigQueryError> {
        self.load_records(target, records).await
    }
}
