//! Newline-delimited JSON staging files.
//!
//! The file is written in full before any load job is submitted and is left
//! on disk afterwards; a rerun for the same table overwrites it.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::BigQueryError;

/// `<dir>/<table>.json`
#[must_use]
pub fn staging_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}.json"))
}

/// Writes one compact JSON object per line, each line ending in `\n`.
///
/// Zero records produce an empty file. `dir` is created if it does not
/// exist.
///
/// # Errors
///
/// Returns [`BigQueryError::Staging`] on any filesystem failure and
/// [`BigQueryError::Encode`] if a record fails to serialize.
pub fn write_ndjson<T: Serialize>(
    dir: &Path,
    table: &str,
    records: &[T],
) -> Result<PathBuf, BigQueryError> {
    let path = staging_path(dir, table);
    let io_err = |source: std::io::Error| BigQueryError::Staging {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(dir).map_err(io_err)?;
    let mut writer = BufWriter::new(File::create(&path).map_err(io_err)?);

    for (idx, record) in records.iter().enumerate() {
        serde_json::to_writer(&mut writer, record).map_err(|e| {
            if e.is_io() {
                io_err(std::io::Error::other(e))
            } else {
                BigQueryError::Encode {
                    context: format!("record {idx} for {table}"),
                    source: e,
                }
            }
        })?;
        writer.write_all(b"\n").map_err(io_err)?;
    }
    writer.flush().map_err(io_err)?;

    tracing::debug!(path = %path.display(), rows = records.len(), "wrote staging file");
    Ok(path)
}
