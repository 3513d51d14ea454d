//! Session orchestration controller.
//!
//! `SessionController` owns the authoritative conversation state and
//! mediates every state-changing user intent against the remote service.
//! It is the sole writer of the store and of the transient session state,
//! so every compound mutation is applied under a single write guard and
//! consumers never observe partial updates.

use super::event::SessionEvent;
use crate::api::{ChatApi, ChatReply};
use crate::conversation::{Conversation, ConversationStore, Message};
use crate::error::{DossierError, Result};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

/// Maximum message length in code points, enforced before any I/O.
pub const MAX_MESSAGE_CHARS: usize = 4000;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Session state guarded by a single lock: the store plus the two
/// transient ids. Mutating them together keeps intents atomic.
struct SessionState {
    store: ConversationStore,
    active_conversation_id: Option<String>,
    /// Conversation with an outstanding send, if any. At most one send is
    /// outstanding system-wide; see `send_message`.
    pending_send: Option<String>,
}

/// The conversation/session orchestrator.
///
/// `SessionController` is responsible for:
/// - Creating, selecting and deleting conversations
/// - Driving the send protocol against the remote service
/// - Reconciling settled sends back into the store exactly once
/// - Publishing state-change events to subscribers
///
/// Suspension happens only at [`ChatApi`] call boundaries; no lock is held
/// across a network call. Cancellation is cooperative: an outstanding send
/// for a deleted conversation settles normally and its reconciliation
/// degrades to a no-op.
pub struct SessionController {
    state: RwLock<SessionState>,
    api: Arc<dyn ChatApi>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionController {
    /// Creates a controller with an empty store and no active conversation.
    pub fn new(api: Arc<dyn ChatApi>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: RwLock::new(SessionState {
                store: ConversationStore::new(),
                active_conversation_id: None,
                pending_send: None,
            }),
            api,
            events,
        }
    }

    /// Subscribes to state-change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    /// Creates an empty conversation and makes it active.
    ///
    /// Always succeeds and never touches an outstanding send.
    pub async fn start_new_chat(&self) -> Conversation {
        let conversation = {
            let mut state = self.state.write().await;
            let conversation = state.store.create();
            state.active_conversation_id = Some(conversation.id.clone());
            conversation
        };
        self.publish(SessionEvent::ConversationCreated {
            conversation_id: conversation.id.clone(),
        });
        self.publish(SessionEvent::ConversationSelected {
            conversation_id: Some(conversation.id.clone()),
        });
        conversation
    }

    /// Makes the given conversation active.
    ///
    /// Returns false (and changes nothing) when the id is unknown. An
    /// outstanding send for a different conversation keeps running in the
    /// background and reconciles silently.
    pub async fn select_conversation(&self, conversation_id: &str) -> bool {
        {
            let mut state = self.state.write().await;
            if !state.store.contains(conversation_id) {
                return false;
            }
            state.active_conversation_id = Some(conversation_id.to_string());
        }
        self.publish(SessionEvent::ConversationSelected {
            conversation_id: Some(conversation_id.to_string()),
        });
        true
    }

    /// Deletes a conversation.
    ///
    /// When the active conversation is deleted, the most recently updated
    /// survivor becomes active (or none). An outstanding send for the
    /// deleted conversation is left to settle; its reconciliation finds
    /// the target gone and drops the result.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the conversation does not exist.
    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<()> {
        let reselected = {
            let mut state = self.state.write().await;
            state.store.delete(conversation_id)?;
            let was_active = state.active_conversation_id.as_deref() == Some(conversation_id);
            if was_active {
                let next_active = state.store.most_recently_updated().map(|c| c.id.clone());
                state.active_conversation_id = next_active;
            }
            was_active.then(|| state.active_conversation_id.clone())
        };
        self.publish(SessionEvent::ConversationDeleted {
            conversation_id: conversation_id.to_string(),
        });
        if let Some(new_active) = reselected {
            self.publish(SessionEvent::ConversationSelected {
                conversation_id: new_active,
            });
        }
        Ok(())
    }

    /// Sends a user message to the active conversation, creating one when
    /// none is active.
    ///
    /// The optimistic user message and the pending assistant placeholder
    /// become visible together before the network call starts, so a user
    /// message is never shown without its thinking indicator. At most one
    /// send is outstanding system-wide; a second send is rejected with
    /// `Busy` regardless of target conversation.
    ///
    /// Returns the settled assistant message, or `None` when the target
    /// conversation was deleted while the send was in flight (the reply is
    /// dropped silently).
    ///
    /// # Errors
    ///
    /// - `Validation` when the trimmed text is empty or exceeds
    ///   [`MAX_MESSAGE_CHARS`] code points (no I/O, no state change)
    /// - `Busy` when a send is already outstanding (prior state untouched)
    /// - `Remote`/`Transport` when the service call fails; the optimistic
    ///   user message stays in history and the placeholder is discarded
    pub async fn send_message(&self, text: &str) -> Result<Option<Message>> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DossierError::validation("message must not be empty"));
        }
        if trimmed.chars().count() > MAX_MESSAGE_CHARS {
            return Err(DossierError::validation(format!(
                "message exceeds {MAX_MESSAGE_CHARS} characters"
            )));
        }

        // Optimistic phase: both appends and the pending marker become
        // visible in one step.
        let (conversation_id, placeholder_id, created) = {
            let mut state = self.state.write().await;
            if let Some(pending) = &state.pending_send {
                return Err(DossierError::busy(pending.clone()));
            }

            let (conversation_id, created) = match state.active_conversation_id.clone() {
                Some(id) => (id, false),
                None => {
                    let conversation = state.store.create();
                    state.active_conversation_id = Some(conversation.id.clone());
                    (conversation.id, true)
                }
            };

            state
                .store
                .append_message(&conversation_id, Message::user(trimmed))?;
            let placeholder = Message::pending_assistant();
            let placeholder_id = placeholder.id.clone();
            state
                .store
                .append_message(&conversation_id, placeholder)?;
            state.pending_send = Some(conversation_id.clone());
            (conversation_id, placeholder_id, created)
        };

        if created {
            self.publish(SessionEvent::ConversationCreated {
                conversation_id: conversation_id.clone(),
            });
            self.publish(SessionEvent::ConversationSelected {
                conversation_id: Some(conversation_id.clone()),
            });
        }
        self.publish(SessionEvent::SendStarted {
            conversation_id: conversation_id.clone(),
        });

        let result = self
            .api
            .send_message(trimmed, Some(&conversation_id))
            .await;

        // Reconciling phase: the pending marker is cleared exactly once,
        // whatever happened to the call or to the conversation meanwhile.
        let mut state = self.state.write().await;
        state.pending_send = None;
        match result {
            Ok(reply) => {
                let ChatReply {
                    response, sources, ..
                } = reply;
                let sources = (!sources.is_empty()).then_some(sources);
                let updated =
                    state
                        .store
                        .update_message(&conversation_id, &placeholder_id, |message| {
                            message.content = response;
                            message.sources = sources;
                            message.pending = false;
                        });
                match updated {
                    Ok(()) => {
                        let message = state
                            .store
                            .get(&conversation_id)
                            .and_then(|c| c.message(&placeholder_id))
                            .cloned();
                        drop(state);
                        self.publish(SessionEvent::SendCompleted {
                            conversation_id: conversation_id.clone(),
                        });
                        Ok(message)
                    }
                    Err(error) if error.is_not_found() => {
                        // The user navigated away and deleted the target;
                        // the reply is stale, not a failure.
                        drop(state);
                        tracing::debug!(
                            "dropping reply for deleted conversation {conversation_id}"
                        );
                        Ok(None)
                    }
                    Err(error) => {
                        drop(state);
                        Err(error)
                    }
                }
            }
            Err(error) => {
                // The thinking indicator must not outlive the call; the
                // optimistic user message stays.
                if let Err(remove_error) =
                    state.store.remove_message(&conversation_id, &placeholder_id)
                    && !remove_error.is_not_found()
                {
                    tracing::warn!("failed to discard placeholder: {remove_error}");
                }
                drop(state);
                self.publish(SessionEvent::SendFailed {
                    conversation_id: conversation_id.clone(),
                    detail: error.to_string(),
                });
                Err(error)
            }
        }
    }

    /// Fetches a conversation history from the service and materializes it
    /// in the store, replacing any local copy with the same id.
    pub async fn restore_conversation(&self, conversation_id: &str) -> Result<Conversation> {
        let payload = self.api.fetch_conversation(conversation_id).await?;
        let conversation = payload.into_conversation();
        {
            let mut state = self.state.write().await;
            state.store.insert(conversation.clone());
        }
        Ok(conversation)
    }

    /// Renders a conversation into a PDF report and returns the bytes.
    ///
    /// The service owns the lookup; an unknown id surfaces as `Remote`
    /// with a 404 status.
    pub async fn export_report(&self, conversation_id: &str) -> Result<Vec<u8>> {
        self.api.generate_report(conversation_id).await
    }

    // ============================================================================
    // Snapshots
    // ============================================================================

    /// All conversations, most recently updated first.
    pub async fn conversations(&self) -> Vec<Conversation> {
        let state = self.state.read().await;
        state.store.list().into_iter().cloned().collect()
    }

    /// The active conversation, if any.
    pub async fn active_conversation(&self) -> Option<Conversation> {
        let state = self.state.read().await;
        let id = state.active_conversation_id.as_deref()?;
        state.store.get(id).cloned()
    }

    /// Id of the active conversation, if any.
    pub async fn active_conversation_id(&self) -> Option<String> {
        self.state.read().await.active_conversation_id.clone()
    }

    /// True while a send is outstanding.
    pub async fn is_sending(&self) -> bool {
        self.state.read().await.pending_send.is_some()
    }
}
