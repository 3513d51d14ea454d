//! Error types for the Dossier application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Dossier application.
///
/// This provides typed, structured error variants with constructor helpers
/// so callers can match on the failure class instead of string contents.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum DossierError {
    /// Input rejected before any I/O (empty/over-long message, unsupported file type)
    #[error("Validation error: {0}")]
    Validation(String),

    /// A send is already outstanding; the new intent was rejected
    #[error("A response is still pending for conversation '{conversation_id}'")]
    Busy { conversation_id: String },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// Non-success response from the remote service
    #[error("Service error ({status}): {detail}")]
    Remote { status: u16, detail: String },

    /// Request failed before any response arrived (connection refused, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DossierError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a Busy error for the given conversation
    pub fn busy(conversation_id: impl Into<String>) -> Self {
        Self::Busy {
            conversation_id: conversation_id.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Remote error from a status code and normalized detail string
    pub fn remote(status: u16, detail: impl Into<String>) -> Self {
        Self::Remote {
            status,
            detail: detail.into(),
        }
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this is a Busy error
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a Remote error
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote { .. })
    }
}

/// A type alias for `Result<T, DossierError>`.
pub type Result<T> = std::result::Result<T, DossierError>;
