//! BigQuery load-job client: stage, submit, and wait.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::Serialize;
use tokio::time::Instant;
use vizbq_auth::Authenticator;
use vizbq_core::WriteDisposition;

use crate::error::BigQueryError;
use crate::job::{Job, JobConfiguration, JobInsert, JobReference, LoadConfiguration, TableReference};
use crate::schema::annotation_table_schema;
use crate::staging::write_ndjson;

const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com";

/// Where a batch goes and how it lands there.
#[derive(Debug, Clone)]
pub struct LoadTarget {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
    pub write_disposition: WriteDisposition,
    /// When `true`, no schema is sent and BigQuery infers one from the data.
    pub schema_autodetect: bool,
}

/// Staging and polling knobs.
#[derive(Debug, Clone)]
pub struct LoadSettings {
    pub staging_dir: PathBuf,
    pub poll_interval: Duration,
    pub load_timeout: Duration,
}

/// Outcome of [`BigQueryClient::load_records`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadSummary {
    pub table: String,
    pub rows: usize,
    /// `None` when the batch was empty and no job was submitted.
    pub job_id: Option<String>,
    pub staging_path: PathBuf,
}

pub struct BigQueryClient {
    client: Client,
    auth: Arc<Authenticator>,
    base_url: Url,
    settings: LoadSettings,
}

impl BigQueryClient {
    /// # Errors
    ///
    /// Returns [`BigQueryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        auth: Arc<Authenticator>,
        timeout_secs: u64,
        user_agent: &str,
        settings: LoadSettings,
    ) -> Result<Self, BigQueryError> {
        Self::with_base_url(auth, timeout_secs, user_agent, settings, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`BigQueryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`BigQueryError::InvalidBaseUrl`] if
    /// `base_url` does not parse as a URL that can carry path segments.
    pub fn with_base_url(
        auth: Arc<Authenticator>,
        timeout_secs: u64,
        user_agent: &str,
        settings: LoadSettings,
        base_url: &str,
    ) -> Result<Self, BigQueryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        let invalid = |reason: String| BigQueryError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason,
        };
        let base_url =
            Url::parse(base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".to_string()));
        }

        Ok(Self {
            client,
            auth,
            base_url,
            settings,
        })
    }

    /// Writes `records` to the staging file, submits one load job for it and
    /// waits for the job to finish.
    ///
    /// An empty batch still writes an (empty) staging file but submits no
    /// job; the summary then carries `job_id: None`.
    ///
    /// # Errors
    ///
    /// - [`BigQueryError::Staging`] / [`BigQueryError::Encode`] if the staging
    ///   file cannot be written.
    /// - [`BigQueryError::UnexpectedStatus`] if job submission or polling
    ///   returns a non-2xx status.
    /// - [`BigQueryError::LoadFailed`] if the job finishes with an error.
    /// - [`BigQueryError::LoadTimeout`] if the job is not done within the
    ///   configured timeout.
    /// - [`BigQueryError::Http`], [`BigQueryError::Auth`],
    ///   [`BigQueryError::Deserialize`] on transport, credential, or body
    ///   failures.
    pub async fn load_records<T: Serialize>(
        &self,
        target: &LoadTarget,
        records: &[T],
    ) -> Result<LoadSummary, BigQueryError> {
        let staging_path = write_ndjson(&self.settings.staging_dir, &target.table_id, records)?;

        if records.is_empty() {
            tracing::info!(
                table = %target.table_id,
                path = %staging_path.display(),
                "empty batch; skipping load job"
            );
            return Ok(LoadSummary {
                table: target.table_id.clone(),
                rows: 0,
                job_id: None,
                staging_path,
            });
        }

        let data = tokio::fs::read(&staging_path)
            .await
            .map_err(|source| BigQueryError::Staging {
                path: staging_path.clone(),
                source,
            })?;

        let submitted = self.insert_load_job(target, data).await?;
        let job_id = submitted.job_reference.job_id.clone();
        tracing::info!(
            table = %target.table_id,
            job_id = %job_id,
            rows = records.len(),
            "submitted load job"
        );

        let finished = self.wait_for_job(submitted).await?;
        if let Some(output_rows) = finished
            .statistics
            .and_then(|s| s.load)
            .and_then(|l| l.output_rows)
        {
            tracing::debug!(job_id = %job_id, output_rows = %output_rows, "load job statistics");
        }

        Ok(LoadSummary {
            table: target.table_id.clone(),
            rows: records.len(),
            job_id: Some(job_id),
            staging_path,
        })
    }

    async fn insert_load_job(&self, target: &LoadTarget, data: Vec<u8>) -> Result<Job, BigQueryError> {
        let insert = JobInsert {
            job_reference: JobReference {
                project_id: target.project_id.clone(),
                job_id: format!("vizbq_load_{}", uuid::Uuid::new_v4().simple()),
                location: None,
            },
            configuration: JobConfiguration {
                load: LoadConfiguration {
                    destination_table: TableReference {
                        project_id: target.project_id.clone(),
                        dataset_id: target.dataset_id.clone(),
                        table_id: target.table_id.clone(),
                    },
                    create_disposition: "CREATE_IF_NEEDED",
                    write_disposition: target.write_disposition,
                    source_format: "NEWLINE_DELIMITED_JSON",
                    autodetect: target.schema_autodetect,
                    schema: (!target.schema_autodetect).then(annotation_table_schema),
                },
            },
        };
        let metadata = serde_json::to_vec(&insert).map_err(|source| BigQueryError::Encode {
            context: "load job configuration".to_string(),
            source,
        })?;

        let boundary = format!("vizbq-{}", uuid::Uuid::new_v4().simple());
        let body = multipart_related(&boundary, &metadata, &data);

        let mut url = self.url(&["upload", "bigquery", "v2", "projects", target.project_id.as_str(), "jobs"]);
        url.query_pairs_mut().append_pair("uploadType", "multipart");

        let token = self.auth.access_token().await?;
        let response = self
            .client
            .post(url.clone())
            .bearer_auth(token)
            .header(CONTENT_TYPE, format!("multipart/related; boundary={boundary}"))
            .body(body)
            .send()
            .await?;

        parse_job(response, &url, "load job insert").await
    }

    /// Polls `jobs.get` until the job reports `DONE`.
    async fn wait_for_job(&self, mut job: Job) -> Result<Job, BigQueryError> {
        let started = Instant::now();
        let reference = job.job_reference.clone();

        loop {
            if job.status.is_done() {
                return match job.status.error_result.take() {
                    Some(error) => Err(BigQueryError::LoadFailed {
                        job_id: reference.job_id,
                        reason: error.reason,
                        message: error.message,
                        details: job
                            .status
                            .errors
                            .iter()
                            .map(|e| format!("{}: {}", e.location, e.message))
                            .collect(),
                    }),
                    None => Ok(job),
                };
            }

            if started.elapsed() >= self.settings.load_timeout {
                return Err(BigQueryError::LoadTimeout {
                    job_id: reference.job_id,
                    state: job.status.state,
                    waited_secs: started.elapsed().as_secs(),
                });
            }

            tracing::debug!(job_id = %reference.job_id, state = %job.status.state, "waiting for load job");
            tokio::time::sleep(self.settings.poll_interval).await;
            job = self.get_job(&reference).await?;
        }
    }

    async fn get_job(&self, reference: &JobReference) -> Result<Job, BigQueryError> {
        let mut url = self.url(&[
            "bigquery",
            "v2",
            "projects",
            reference.project_id.as_str(),
            "jobs",
            reference.job_id.as_str(),
        ]);
        if let Some(location) = &reference.location {
            url.query_pairs_mut().append_pair("location", location);
        }

        let token = self.auth.access_token().await?;
        let response = self.client.get(url.clone()).bearer_auth(token).send().await?;
        parse_job(response, &url, "load job status").await
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

async fn parse_job(
    response: reqwest::Response,
    url: &Url,
    context: &str,
) -> Result<Job, BigQueryError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BigQueryError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_string(),
            body,
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|source| BigQueryError::Deserialize {
        context: context.to_string(),
        source,
    })
}

/// Assembles a two-part `multipart/related` body: JSON metadata, then the
/// raw upload.
fn multipart_related(boundary: &str, metadata: &[u8], data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + data.len() + 256);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}
