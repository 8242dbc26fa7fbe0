//! Chat module for bookbot
//!
//! Streaming chat session against the textbook's RAG backend: message log,
//! session continuity, request queue, selection-driven queries and
//! cancellation.

pub mod chat_events;
pub mod chat_state;
pub mod message;
pub mod selection;
pub mod worker;

pub use chat_state::{ChatRequest, ChatResponse, ChatState, SubmitOutcome};
pub use message::{Language, Message, Role, UserBackground};
