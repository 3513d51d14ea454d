//! In-memory conversation collection.
//!
//! `ConversationStore` is the authoritative collection of conversations.
//! It performs pure, synchronous data manipulation only; all I/O and all
//! concurrency control live in the session controller that owns it.

use super::message::Message;
use super::model::Conversation;
use crate::error::{DossierError, Result};
use std::collections::HashMap;

/// The authoritative in-memory collection of conversations.
///
/// Conversations are keyed by id and listed for display ordered by
/// `updated_at` descending (most recently touched first).
#[derive(Debug, Default)]
pub struct ConversationStore {
    conversations: HashMap<String, Conversation>,
}

impl ConversationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new empty conversation and adds it to the collection.
    ///
    /// The conversation gets a fresh id, the default title, and both
    /// timestamps set to now. A clone is returned for the caller.
    pub fn create(&mut self) -> Conversation {
        let conversation = Conversation::new();
        self.conversations
            .insert(conversation.id.clone(), conversation.clone());
        conversation
    }

    /// Inserts a conversation wholesale, replacing any existing one with
    /// the same id. Used to materialize a conversation restored from the
    /// service.
    pub fn insert(&mut self, conversation: Conversation) {
        self.conversations
            .insert(conversation.id.clone(), conversation);
    }

    /// Returns the conversation with the given id, if present.
    pub fn get(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.get(conversation_id)
    }

    /// Returns true if a conversation with the given id exists.
    pub fn contains(&self, conversation_id: &str) -> bool {
        self.conversations.contains_key(conversation_id)
    }

    /// Appends a message to a conversation.
    ///
    /// Refreshes the conversation's `updated_at` and, when this is the
    /// first message and it comes from the user, derives the title from
    /// its content.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the conversation no longer exists (already
    /// deleted).
    pub fn append_message(&mut self, conversation_id: &str, message: Message) -> Result<()> {
        let conversation = self
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| DossierError::not_found("conversation", conversation_id))?;
        conversation.push(message);
        Ok(())
    }

    /// Applies a mutation to a message in place, refreshing `updated_at`.
    ///
    /// Used to finalize the pending assistant placeholder once the service
    /// reply settles.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if either the conversation or the message is
    /// absent (e.g. the conversation was deleted while a send was in
    /// flight). Callers reconciling a settled send absorb this silently.
    pub fn update_message<F>(
        &mut self,
        conversation_id: &str,
        message_id: &str,
        mutate: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Message),
    {
        let conversation = self
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| DossierError::not_found("conversation", conversation_id))?;
        let message = conversation
            .messages
            .iter_mut()
            .find(|m| m.id == message_id)
            .ok_or_else(|| DossierError::not_found("message", message_id))?;
        mutate(message);
        conversation.updated_at = chrono::Utc::now();
        Ok(())
    }

    /// Removes a message from a conversation and returns it.
    ///
    /// Used to discard the pending placeholder when a send fails.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if either the conversation or the message is
    /// absent.
    pub fn remove_message(&mut self, conversation_id: &str, message_id: &str) -> Result<Message> {
        let conversation = self
            .conversations
            .get_mut(conversation_id)
            .ok_or_else(|| DossierError::not_found("conversation", conversation_id))?;
        let index = conversation
            .messages
            .iter()
            .position(|m| m.id == message_id)
            .ok_or_else(|| DossierError::not_found("message", message_id))?;
        Ok(conversation.messages.remove(index))
    }

    /// Removes a conversation from the collection and returns it.
    ///
    /// The caller is responsible for re-deriving the active conversation
    /// if the removed one was active.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the conversation does not exist.
    pub fn delete(&mut self, conversation_id: &str) -> Result<Conversation> {
        self.conversations
            .remove(conversation_id)
            .ok_or_else(|| DossierError::not_found("conversation", conversation_id))
    }

    /// Lists all conversations ordered by `updated_at` descending.
    pub fn list(&self) -> Vec<&Conversation> {
        let mut conversations: Vec<&Conversation> = self.conversations.values().collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        conversations
    }

    /// Returns the most recently updated conversation, if any.
    pub fn most_recently_updated(&self) -> Option<&Conversation> {
        self.conversations.values().max_by_key(|c| c.updated_at)
    }

    /// Number of conversations in the collection.
    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    /// Returns true when the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }
}
