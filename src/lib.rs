//! bookbot library - chat client for the Physical AI textbook backend
//!
//! This library exposes the chat session, backend gateway, auth and chapter
//! tools used by the `bookbot` binary.

pub mod app;
pub mod auth;
pub mod chapter;
pub mod chat;
pub mod config;
pub mod error;
pub mod gateway;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use app::App;
pub use chat::ChatState;
pub use config::Config;
pub use gateway::{BackendClient, GatewayError};
