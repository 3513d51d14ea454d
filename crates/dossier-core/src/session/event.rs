use serde::{Deserialize, Serialize};

/// State-change notifications published by the session controller.
///
/// Consumers subscribe through [`super::SessionController::subscribe`] and
/// re-read snapshots when an event arrives; events carry ids, not data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A conversation was created (explicitly or by a first send).
    ConversationCreated { conversation_id: String },
    /// The active conversation changed; `None` means nothing is selected.
    ConversationSelected { conversation_id: Option<String> },
    /// A conversation was deleted.
    ConversationDeleted { conversation_id: String },
    /// A send went on the wire; the pending placeholder is visible.
    SendStarted { conversation_id: String },
    /// The outstanding send settled successfully.
    SendCompleted { conversation_id: String },
    /// The outstanding send failed; the placeholder was discarded.
    SendFailed {
        conversation_id: String,
        detail: String,
    },
}
