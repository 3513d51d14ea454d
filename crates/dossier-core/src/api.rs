//! Remote service contract.
//!
//! Defines the interface to the assistant/document-processing service,
//! decoupling the orchestration logic from the HTTP transport. The wire
//! DTOs mirror the service's JSON payloads field for field.

use crate::conversation::{self, Conversation, Message, MessageRole, Source};
use crate::document::DocumentRecord;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Response of the send-message operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// The assistant's answer text.
    pub response: String,
    /// Conversation the answer belongs to (assigned by the service when
    /// the request carried none).
    pub conversation_id: String,
    /// Citations backing the answer, most relevant first.
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// A file staged for upload, with its declared media type.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    /// Stages a file, guessing the media type from the filename when the
    /// caller has none to declare.
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let media_type = crate::document::detect_media_type(&filename);
        Self {
            filename,
            media_type,
            bytes,
        }
    }
}

/// Per-file result inside an upload acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadedFileAck {
    pub file_id: String,
    pub filename: String,
    /// Number of chunks indexed, on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks: Option<usize>,
    /// Processing error, on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Acknowledgement returned by the upload operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAck {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub files: Vec<UploadedFileAck>,
}

/// One message inside a fetched conversation payload.
///
/// Timestamps stay in their ISO 8601 wire form here; they are parsed when
/// the payload is materialized into a [`Conversation`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePayload {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

/// A conversation history as fetched from the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationPayload {
    pub conversation_id: String,
    #[serde(default)]
    pub messages: Vec<MessagePayload>,
}

impl ConversationPayload {
    /// Materializes the payload into a [`Conversation`], preserving
    /// message order, roles, timestamps and sources. The title is
    /// re-derived from the first user message.
    pub fn into_conversation(self) -> Conversation {
        let messages: Vec<Message> = self
            .messages
            .into_iter()
            .map(|payload| {
                let timestamp = parse_timestamp(&payload.timestamp);
                Message::from_history(payload.role, payload.content, timestamp, payload.sources)
            })
            .collect();

        let title = messages
            .iter()
            .find(|m| m.role == MessageRole::User)
            .map(|m| conversation::derive_title(&m.content))
            .unwrap_or_else(|| conversation::DEFAULT_TITLE.to_string());

        let created_at = messages
            .first()
            .map(|m| m.timestamp)
            .unwrap_or_else(Utc::now);
        let updated_at = messages
            .last()
            .map(|m| m.timestamp)
            .unwrap_or(created_at);

        Conversation {
            id: self.conversation_id,
            title,
            messages,
            created_at,
            updated_at,
        }
    }
}

/// Parses a service timestamp, which may or may not carry an offset.
///
/// Falls back to the current instant when the value is unparsable, so a
/// malformed history entry cannot poison a restore.
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return parsed.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc();
    }
    tracing::warn!("unparsable timestamp in conversation payload: {raw}");
    Utc::now()
}

/// The remote operations the orchestration layer depends on.
///
/// This trait defines the contract for the assistant service, decoupling
/// the controller and registry from the HTTP client. All operations map a
/// non-success response to `Remote { status, detail }` with a normalized
/// detail string; none of them retries.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// Sends a user message, optionally within an existing conversation.
    async fn send_message(
        &self,
        message: &str,
        conversation_id: Option<&str>,
    ) -> Result<ChatReply>;

    /// Lists every ingested document.
    async fn list_documents(&self) -> Result<Vec<DocumentRecord>>;

    /// Uploads a batch of reference documents for ingestion.
    ///
    /// Callers are responsible for client-side file-type filtering before
    /// invoking this.
    async fn upload_documents(&self, files: Vec<UploadFile>) -> Result<UploadAck>;

    /// Deletes an ingested document.
    async fn delete_document(&self, document_id: &str) -> Result<()>;

    /// Fetches a conversation history.
    async fn fetch_conversation(&self, conversation_id: &str) -> Result<ConversationPayload>;

    /// Renders a conversation into a PDF report and returns the bytes.
    async fn generate_report(&self, conversation_id: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload_message(role: MessageRole, content: &str, timestamp: &str) -> MessagePayload {
        MessagePayload {
            role,
            content: content.to_string(),
            timestamp: timestamp.to_string(),
            sources: None,
        }
    }

    #[test]
    fn into_conversation_preserves_order_and_roles() {
        let payload = ConversationPayload {
            conversation_id: "c-1".to_string(),
            messages: vec![
                payload_message(MessageRole::User, "why is the sky blue?", "2025-06-01T10:00:00"),
                payload_message(MessageRole::Assistant, "Rayleigh scattering.", "2025-06-01T10:00:05"),
                payload_message(MessageRole::User, "and sunsets?", "2025-06-01T10:01:00"),
                payload_message(MessageRole::Assistant, "Longer path, more scattering.", "2025-06-01T10:01:04"),
            ],
        };

        let conversation = payload.into_conversation();

        assert_eq!(conversation.id, "c-1");
        assert_eq!(conversation.messages.len(), 4);
        assert_eq!(conversation.title, "why is the sky blue?");
        let roles: Vec<MessageRole> = conversation.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::Assistant
            ]
        );
        for pair in conversation.messages.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        assert_eq!(conversation.created_at, conversation.messages[0].timestamp);
        assert_eq!(conversation.updated_at, conversation.messages[3].timestamp);
    }

    #[test]
    fn into_conversation_handles_empty_history() {
        let payload = ConversationPayload {
            conversation_id: "c-empty".to_string(),
            messages: Vec::new(),
        };

        let conversation = payload.into_conversation();
        assert_eq!(conversation.title, crate::conversation::DEFAULT_TITLE);
        assert!(conversation.messages.is_empty());
        assert!(conversation.updated_at >= conversation.created_at);
    }

    #[test]
    fn parse_timestamp_accepts_offset_and_naive_forms() {
        let with_offset = parse_timestamp("2025-06-01T10:00:00+00:00");
        let naive = parse_timestamp("2025-06-01T10:00:00.123456");
        assert_eq!(with_offset.date_naive(), naive.date_naive());
    }

    #[test]
    fn chat_reply_deserializes_without_sources() {
        let json = r#"{"response":"hi","conversation_id":"c-1"}"#;
        let reply: ChatReply = serde_json::from_str(json).unwrap();
        assert!(reply.sources.is_empty());
    }
}
