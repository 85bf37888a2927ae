//! CSV downloads.

use arrow_csv::WriterBuilder;
use bytes::Bytes;
use serde::Serialize;
use tracing::debug;

use crate::dataset::{Error, Table};

pub const CSV_MIME: &str = "text/csv";
pub const SOURCE_FILE_NAME: &str = "source_data.csv";
pub const FILTERED_FILE_NAME: &str = "filtered_data.csv";

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Encoded CSV bytes of a table plus their size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    #[serde(skip)]
    bytes: Bytes,
    byte_length: usize,
    human_size: String,
}

impl ExportArtifact {
    fn new(bytes: Bytes) -> Self {
        let byte_length = bytes.len();
        Self {
            bytes,
            byte_length,
            human_size: format_size(byte_length as u64),
        }
    }

    #[must_use]
    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    #[must_use]
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    #[must_use]
    pub fn human_size(&self) -> &str {
        &self.human_size
    }
}

/// Serialize `table` as UTF-8 CSV with a header row.
///
/// Dates are written as `YYYY-MM-DD`, missing measurements as empty fields.
/// An empty table produces the header row only.
pub fn export_csv(table: &Table) -> Result<ExportArtifact, Error> {
    let mut writer = WriterBuilder::new().with_header(true).build(Vec::new());
    writer.write(table.batch())?;
    let artifact = ExportArtifact::new(Bytes::from(writer.into_inner()));
    debug!(
        rows = table.num_rows(),
        bytes = artifact.byte_length,
        "Encoded table as CSV"
    );
    Ok(artifact)
}

/// Format a byte count with 1024-based units and two fraction digits.
///
/// A unit is only promoted once the value is strictly greater than 1024, so
/// `1024` stays `"1024.00 B"`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_size(size_in_bytes: u64) -> String {
    let mut size = size_in_bytes as f64;
    let mut unit = 0;
    while size > 1024.0 && unit < SIZE_UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    format!("{size:.2} {}", SIZE_UNITS[unit])
}

/// A downloadable file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Download {
    file_name: &'static str,
    mime: &'static str,
    #[serde(flatten)]
    artifact: ExportArtifact,
}

impl Download {
    #[must_use]
    pub fn source(artifact: ExportArtifact) -> Self {
        Self {
            file_name: SOURCE_FILE_NAME,
            mime: CSV_MIME,
            artifact,
        }
    }

    #[must_use]
    pub fn filtered(artifact: ExportArtifact) -> Self {
        Self {
            file_name: FILTERED_FILE_NAME,
            mime: CSV_MIME,
            artifact,
        }
    }

    #[must_use]
    pub fn file_name(&self) -> &'static str {
        self.file_name
    }

    #[must_use]
    pub fn mime(&self) -> &'static str {
        self.mime
    }

    #[must_use]
    pub fn artifact(&self) -> &ExportArtifact {
        &self.artifact
    }
}
