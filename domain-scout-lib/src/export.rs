//! Typed report export.
//!
//! Probe and check results are exported as a versioned JSON document that can
//! be written to disk and rendered later. Decoding goes through serde only;
//! the document content is data, never something to evaluate.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainScoutError;
use crate::types::{DomainCheck, DomainMetadata, ProbeReport};

/// Version written into every export document.
///
/// Documents with a different version are rejected on decode.
pub const FORMAT_VERSION: u32 = 1;

/// A saved scouting report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    /// Document format version, always [`FORMAT_VERSION`] when encoding
    pub format_version: u32,

    /// When the document was generated
    pub generated_at: DateTime<Utc>,

    /// The base name or domain the report was generated for
    pub query: String,

    /// One entry per checked candidate
    pub checks: Vec<DomainCheck>,

    /// Resolved metadata, present for single-domain info exports
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DomainMetadata>,
}

impl ExportDocument {
    /// Build a document from a multi-suffix probe report.
    pub fn from_report(report: &ProbeReport) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            generated_at: Utc::now(),
            query: report.base_name.clone(),
            checks: report.checks.clone(),
            metadata: None,
        }
    }

    /// Build a document from a single domain check.
    pub fn from_check(check: &DomainCheck) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            generated_at: Utc::now(),
            query: check.domain.clone(),
            checks: vec![check.clone()],
            metadata: None,
        }
    }

    /// Attach resolved metadata to the document.
    pub fn with_metadata(mut self, metadata: DomainMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Encode the document as pretty-printed JSON.
    pub fn encode(&self) -> Result<String, DomainScoutError> {
        serde_json::to_string_pretty(self).map_err(Into::into)
    }

    /// Decode a document from JSON.
    ///
    /// # Errors
    ///
    /// Returns `DomainScoutError::ParseError` for malformed input or an
    /// unsupported `format_version`.
    pub fn decode(input: &str) -> Result<Self, DomainScoutError> {
        let document: Self = serde_json::from_str(input)?;

        if document.format_version != FORMAT_VERSION {
            return Err(DomainScoutError::ParseError {
                message: format!(
                    "Unsupported format_version {} (expected {})",
                    document.format_version, FORMAT_VERSION
                ),
                content: None,
            });
        }

        Ok(document)
    }

    /// Write the encoded document to a file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DomainScoutError> {
        let path = path.as_ref();
        let encoded = self.encode()?;

        fs::write(path, encoded).map_err(|e| {
            DomainScoutError::file_error(
                path.to_string_lossy(),
                format!("Failed to write export file: {}", e),
            )
        })?;

        tracing::debug!(path = %path.display(), "saved export document");
        Ok(())
    }

    /// Read and decode a document from a file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DomainScoutError> {
        let path = path.as_ref();

        let content = fs::read_to_string(path).map_err(|e| {
            DomainScoutError::file_error(
                path.to_string_lossy(),
                format!("Failed to read export file: {}", e),
            )
        })?;

        Self::decode(&content)
    }
}
