use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Destination table for every run. Not configurable.
pub const ANNOTATIONS_TABLE: &str = "gcp_vision_api_annotations";

/// How a load job treats rows already present in the destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WriteDisposition {
    /// Replace the table contents.
    WriteTruncate,
    WriteAppend,
    /// Fail if the table already holds data.
    WriteEmpty,
}

impl WriteDisposition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            WriteDisposition::WriteTruncate => "WRITE_TRUNCATE",
            WriteDisposition::WriteAppend => "WRITE_APPEND",
            WriteDisposition::WriteEmpty => "WRITE_EMPTY",
        }
    }
}

impl std::fmt::Display for WriteDisposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WriteDisposition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WRITE_TRUNCATE" => Ok(WriteDisposition::WriteTruncate),
            "WRITE_APPEND" => Ok(WriteDisposition::WriteAppend),
            "WRITE_EMPTY" => Ok(WriteDisposition::WriteEmpty),
            _ => Err(ConfigError::InvalidWriteDisposition(s.to_string())),
        }
    }
}

/// Parameters for a single bucket-to-table run, fixed at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub project_id: String,
    pub input_bucket: String,
    pub output_dataset: String,
    pub credentials_path: PathBuf,
    pub write_disposition: WriteDisposition,
}

impl RunConfig {
    /// Builds a run configuration, rejecting blank identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyField`] if the project, bucket, or dataset
    /// is empty after trimming.
    pub fn new(
        project_id: impl Into<String>,
        input_bucket: impl Into<String>,
        output_dataset: impl Into<String>,
        credentials_path: impl Into<PathBuf>,
        write_disposition: WriteDisposition,
    ) -> Result<Self, ConfigError> {
        let project_id = non_empty("project_id", project_id.into())?;
        let input_bucket = non_empty("input_bucket", input_bucket.into())?;
        let output_dataset = non_empty("output_dataset", output_dataset.into())?;

        Ok(Self {
            project_id,
            input_bucket,
            output_dataset,
            credentials_path: credentials_path.into(),
            write_disposition,
        })
    }

    /// The fixed destination table name.
    #[must_use]
    pub fn table_name(&self) -> &'static str {
        ANNOTATIONS_TABLE
    }
}

fn non_empty(field: &'static str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::EmptyField { field });
    }
    Ok(trimmed.to_string())
}
