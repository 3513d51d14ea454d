//! Session orchestration module.
//!
//! # Module Structure
//!
//! - `controller`: The session orchestrator (`SessionController`)
//! - `event`: State-change notifications (`SessionEvent`)

mod controller;
mod event;

// Re-export public API
pub use controller::{MAX_MESSAGE_CHARS, SessionController};
pub use event::SessionEvent;
