//! Conversation message types.
//!
//! This module contains types for representing messages in a conversation,
//! including roles, citation sources, and the pending-response placeholder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A snippet of retrieved reference material attached to an assistant message.
///
/// Sources are read-only: they are attached at message-creation time from
/// the service response and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// The cited text snippet.
    pub content: String,
    /// Origin label, typically the document filename.
    pub source: String,
    /// Relevance score in `[0, 1]`.
    pub score: f64,
}

/// A single message in a conversation history.
///
/// A message is immutable once created, with one exception: the assistant
/// placeholder appended while a response is outstanding. Its `content`,
/// `sources` and `pending` flag are resolved exactly once when the service
/// reply settles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID format).
    pub id: String,
    /// The content of the message.
    pub content: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// Timestamp when the message was created.
    pub timestamp: DateTime<Utc>,
    /// True while the assistant response for this message is still outstanding.
    #[serde(default)]
    pub pending: bool,
    /// Citations attached to an assistant message, in service order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl Message {
    /// Creates a user message with the given content, fixed at creation.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role: MessageRole::User,
            timestamp: Utc::now(),
            pending: false,
            sources: None,
        }
    }

    /// Creates the provisional assistant message shown while a response is
    /// outstanding (the "thinking" indicator).
    pub fn pending_assistant() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: String::new(),
            role: MessageRole::Assistant,
            timestamp: Utc::now(),
            pending: true,
            sources: None,
        }
    }

    /// Creates an already-settled message with an explicit timestamp, used
    /// when restoring history fetched from the service.
    pub fn from_history(
        role: MessageRole,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
        sources: Option<Vec<Source>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role,
            timestamp,
            pending: false,
            sources,
        }
    }
}
