//! Conversation domain module.
//!
//! This module contains the conversation domain models and the in-memory
//! store that holds them.
//!
//! # Module Structure
//!
//! - `message`: Message types (`MessageRole`, `Source`, `Message`)
//! - `model`: Core conversation domain model (`Conversation`)
//! - `store`: In-memory authoritative collection (`ConversationStore`)

mod message;
mod model;
mod store;

// Re-export public API
pub use message::{Message, MessageRole, Source};
pub use model::{Conversation, DEFAULT_TITLE};
pub use store::ConversationStore;

pub(crate) use model::derive_title;
