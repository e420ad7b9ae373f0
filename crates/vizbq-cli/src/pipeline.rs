//! Batch orchestration: list, annotate, normalize, load.
//!
//! The listing is materialized first. Images are annotated with at most
//! `max_concurrent` requests in flight while preserving listing order, and
//! the complete batch is handed to the loader exactly once. Any failure
//! before the load aborts the run with nothing written.

use futures::stream::{self, StreamExt, TryStreamExt};
use thiserror::Error;
use vizbq_bigquery::{BigQueryError, LoadSummary, LoadTarget};
use vizbq_core::{NormalizedRecord, RunConfig};
use vizbq_gcs::GcsError;
use vizbq_vision::{assemble_record, AnnotateImageResponse, VisionError};

pub(crate) trait ObjectLister {
    /// Every object in `bucket` as a `gs://` locator, in listing order.
    async fn list_image_uris(&self, bucket: &str) -> Result<Vec<String>, GcsError>;
}

pub(crate) trait ImageAnnotator {
    async fn annotate(&self, image_uri: &str) -> Result<AnnotateImageResponse, VisionError>;
}

pub(crate) trait BatchLoader {
    async fn load(
        &self,
        target: &LoadTarget,
        records: &[NormalizedRecord],
    ) -> Result<LoadSummary, BigQueryError>;
}

#[derive(Debug, Error)]
pub(crate) enum PipelineError {
    #[error("failed to list bucket {bucket}: {source}")]
    List {
        bucket: String,
        #[source]
        source: GcsError,
    },

    #[error("failed to annotate {uri}: {source}")]
    Annotate {
        uri: String,
        #[source]
        source: VisionError,
    },

    #[error("failed to normalize annotations for {uri}: {source}")]
    Normalize {
        uri: String,
        #[source]
        source: VisionError,
    },

    #[error("failed to load table {table}: {source}")]
    Load {
        table: String,
        #[source]
        source: BigQueryError,
    },
}

/// Annotates one image and assembles its record. The locator doubles as the
/// creative id.
///
/// # Errors
///
/// Returns [`PipelineError::Annotate`] if the request fails or the service
/// reports an error for the image, and [`PipelineError::Normalize`] if the
/// response cannot be flattened.
pub(crate) async fn annotate_one<A: ImageAnnotator>(
    annotator: &A,
    image_uri: &str,
) -> Result<NormalizedRecord, PipelineError> {
    let response = annotator
        .annotate(image_uri)
        .await
        .map_err(|source| PipelineError::Annotate {
            uri: image_uri.to_owned(),
            source,
        })?;

    let record = assemble_record(&response, image_uri, image_uri).map_err(|source| {
        PipelineError::Normalize {
            uri: image_uri.to_owned(),
            source,
        }
    })?;

    tracing::debug!(
        uri = %image_uri,
        faces = record.face_count(),
        labels = response.label_annotations.len(),
        "annotated image"
    );
    Ok(record)
}

/// Runs one bucket-to-table batch.
///
/// # Errors
///
/// Returns the first [`PipelineError`] encountered. A load failure is also
/// logged with the destination table before being returned.
pub(crate) async fn run_pipeline<L, A, B>(
    lister: &L,
    annotator: &A,
    loader: &B,
    run: &RunConfig,
    max_concurrent: usize,
    schema_autodetect: bool,
) -> Result<LoadSummary, PipelineError>
where
    L: ObjectLister,
    A: ImageAnnotator,
    B: BatchLoader,
{
    let uris = lister
        .list_image_uris(&run.input_bucket)
        .await
        .map_err(|source| PipelineError::List {
            bucket: run.input_bucket.clone(),
            source,
        })?;
    tracing::info!(bucket = %run.input_bucket, images = uris.len(), "starting annotation");

    let records: Vec<NormalizedRecord> = stream::iter(uris.iter())
        .map(|uri| annotate_one(annotator, uri))
        .buffered(max_concurrent.max(1))
        .try_collect()
        .await?;

    let target = LoadTarget {
        project_id: run.project_id.clone(),
        dataset_id: run.output_dataset.clone(),
        table_id: run.table_name().to_string(),
        write_disposition: run.write_disposition,
        schema_autodetect,
    };

    loader.load(&target, &records).await.map_err(|source| {
        tracing::error!(table = %target.table_id, error = %source, "load failed");
        PipelineError::Load {
            table: target.table_id.clone(),
            source,
        }
    })
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
