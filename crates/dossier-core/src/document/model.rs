//! Ingested document records.

use serde::{Deserialize, Serialize};

/// Processing status of an ingested document, as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Accepted, waiting to be processed.
    Pending,
    /// Text extraction and indexing in progress.
    Processing,
    /// Fully indexed and available for retrieval.
    Processed,
    /// Processing failed.
    Error,
}

impl DocumentStatus {
    /// Returns true once the service will not change this status anymore.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Processed | Self::Error)
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Processed => "processed",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// A single ingested reference document.
///
/// Records are not linked to any conversation; they form an independent
/// registry refreshed wholesale from the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Original filename as uploaded.
    pub filename: String,
    /// Upload timestamp (ISO 8601 format, as reported by the service).
    pub upload_date: String,
    /// Current processing status.
    pub status: DocumentStatus,
    /// Number of indexed chunks, once known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_count: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(DocumentStatus::Processed.is_terminal());
        assert!(DocumentStatus::Error.is_terminal());
        assert!(!DocumentStatus::Pending.is_terminal());
        assert!(!DocumentStatus::Processing.is_terminal());
    }

    #[test]
    fn record_round_trips_through_wire_format() {
        let json = r#"{"filename":"notes.pdf","upload_date":"2025-06-01T12:00:00","status":"processed","chunks_count":12}"#;
        let record: DocumentRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.status, DocumentStatus::Processed);
        assert_eq!(record.chunks_count, Some(12));

        let missing_chunks = r#"{"filename":"slides.pptx","upload_date":"2025-06-01T12:00:00","status":"processing"}"#;
        let record: DocumentRecord = serde_json::from_str(missing_chunks).unwrap();
        assert_eq!(record.chunks_count, None);
    }
}
