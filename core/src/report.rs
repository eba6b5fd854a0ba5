//! # Report Export
//!
//! Flattens [`InventoryRecord`]s into rows and writes them to disk.
//!
//! One row per resource with four columns: identifier, missing labels (or
//! `No Tags`), the partition it was found in and the owning service.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tagscan_common::resource::InventoryRecord;
use thiserror::Error;
use tracing::debug;

/// Format of the stamp appended by [`timestamped_path`].
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("cannot write report to {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("cannot flush report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Resource ARN")]
    pub resource_arn: String,
    #[serde(rename = "Missing Tags")]
    pub missing_tags: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Service")]
    pub service: String,
}

impl From<&InventoryRecord> for ReportRow {
    fn from(record: &InventoryRecord) -> Self {
        Self {
            resource_arn: record.id().to_string(),
            missing_tags: record.gap().to_string(),
            region: record.partition().to_string(),
            service: record.service().to_string(),
        }
    }
}

pub fn rows(records: &[InventoryRecord]) -> Vec<ReportRow> {
    records.iter().map(ReportRow::from).collect()
}

/// Destination for report rows.
pub trait ReportSink {
    /// Writes `rows` and returns where they went.
    ///
    /// Nothing is written for an empty slice and `Ok(None)` is returned.
    fn write(&self, rows: &[ReportRow]) -> Result<Option<PathBuf>, ReportError>;
}

/// Comma-separated report with a header line.
#[derive(Debug, Clone)]
pub struct CsvReport {
    path: PathBuf,
}

impl CsvReport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for CsvReport {
    fn write(&self, rows: &[ReportRow]) -> Result<Option<PathBuf>, ReportError> {
        if rows.is_empty() {
            return Ok(None);
        }

        let csv_err = |source: csv::Error| ReportError::Csv {
            path: self.path.clone(),
            source,
        };

        let mut writer = csv::Writer::from_path(&self.path).map_err(csv_err)?;
        for row in rows {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| ReportError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!("Wrote {} rows to {}", rows.len(), self.path.display());
        Ok(Some(self.path.clone()))
    }
}

/// Inserts `_<stamp>` between the file stem and its extension.
///
/// `reports/missing.csv` with `20240101_120000` becomes
/// `reports/missing_20240101_120000.csv`.
pub fn timestamped_path(path: &Path, stamp: &str) -> PathBuf {
    let mut name: OsString = path
        .file_stem()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("report"));
    name.push("_");
    name.push(stamp);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

pub fn local_stamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
