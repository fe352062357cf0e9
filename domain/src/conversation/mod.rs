//! Conversation domain module
//!
//! [`ConversationState`] is the single piece of mutable state threaded through
//! the orchestration graph. It owns an append-only list of [`Message`]s and
//! derives the set of pending tool invocations from it.

pub mod message;
pub mod state;

pub use message::Message;
pub use state::ConversationState;
