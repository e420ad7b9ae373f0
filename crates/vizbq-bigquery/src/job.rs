//! BigQuery `jobs` REST resource types, limited to what a load job needs.

use serde::{Deserialize, Serialize};
use vizbq_core::WriteDisposition;

use crate::schema::TableSchema;

/// Request body of `jobs.insert` for a load job.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInsert {
    pub job_reference: JobReference,
    pub configuration: JobConfiguration,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobReference {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub job_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobConfiguration {
    pub load: LoadConfiguration,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadConfiguration {
    pub destination_table: TableReference,
    pub create_disposition: &'static str,
    pub write_disposition: WriteDisposition,
    pub source_format: &'static str,
    pub autodetect: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableReference {
    pub project_id: String,
    pub dataset_id: String,
    pub table_id: String,
}

/// The subset of the `Job` resource read back from insert and get.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    pub job_reference: JobReference,
    pub status: JobStatus,
    pub statistics: Option<JobStatistics>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobStatus {
    /// `PENDING`, `RUNNING` or `DONE`.
    pub state: String,
    pub error_result: Option<ErrorProto>,
    pub errors: Vec<ErrorProto>,
}

impl JobStatus {
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.state == "DONE"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorProto {
    pub reason: String,
    pub location: String,
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobStatistics {
    pub load: Option<LoadStatistics>,
}

/// Int64 values arrive as JSON strings.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoadStatistics {
    pub output_rows: Option<String>,
    pub bad_records: Option<String>,
}
