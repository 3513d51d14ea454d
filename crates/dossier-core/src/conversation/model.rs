//! Conversation domain model.

use super::message::{Message, MessageRole};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to a conversation before its first user message arrives,
/// and kept when that message is empty.
pub const DEFAULT_TITLE: &str = "New Chat";

/// Maximum number of code points kept when deriving a title.
const TITLE_MAX_CHARS: usize = 50;

/// A titled, ordered session of messages with its own lifecycle.
///
/// Invariants:
/// - `messages` is chronological and non-decreasing in timestamp;
/// - `updated_at >= created_at`, refreshed on every append;
/// - the title is derived from the first user message once, then only
///   changes if the conversation is replaced wholesale on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation identifier (UUID format).
    pub id: String,
    /// Human-readable conversation title.
    pub title: String,
    /// Ordered message history.
    pub messages: Vec<Message>,
    /// Timestamp when the conversation was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the conversation was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Creates an empty conversation with a fresh id and the default title.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title: DEFAULT_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Appends a message, refreshing `updated_at` and deriving the title
    /// when this is the first message and it comes from the user.
    pub(crate) fn push(&mut self, message: Message) {
        if self.messages.is_empty() && message.role == MessageRole::User {
            self.title = derive_title(&message.content);
        }
        self.updated_at = Utc::now();
        self.messages.push(message);
    }

    /// Returns the message with the given id, if present.
    pub fn message(&self, message_id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == message_id)
    }
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

/// Derives a display title from the first user message.
///
/// The content is whitespace-trimmed and truncated to a bounded number of
/// code points; empty content falls back to [`DEFAULT_TITLE`] so a title is
/// never an empty string.
pub(crate) fn derive_title(content: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    if trimmed.chars().count() <= TITLE_MAX_CHARS {
        return trimmed.to_string();
    }
    let mut title: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
    title.truncate(title.trim_end().len());
    title.push_str("...");
    title
}
