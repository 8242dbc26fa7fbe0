//! Chat session state management
//!
//! Owns the message log, session id, busy flags, request queue and selection
//! bridge, plus the channel handles for talking to the worker thread. All
//! mutation happens on the thread that owns `ChatState`; the worker only
//! ever sends `ChatResponse` values back.

use std::sync::mpsc::{Receiver, Sender};

use tokio_util::sync::CancellationToken;

use super::message::{Message, UserBackground};
use super::selection::SelectionBridge;
use crate::gateway::{ChatBody, SendRoute};

mod lifecycle;
pub mod queue;
mod response;

pub use queue::RequestQueue;

/// Request messages sent to the chat worker thread
#[derive(Debug)]
pub enum ChatRequest {
    /// Streaming chat over `/rag/chat/stream`
    Stream {
        body: ChatBody,
        /// Unique ID for this request, used to filter stale responses
        request_id: u64,
        cancel_token: CancellationToken,
    },
    /// One of the request/response chat operations
    Send {
        route: SendRoute,
        request_id: u64,
        cancel_token: CancellationToken,
    },
}

/// Response messages received from the chat worker thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatResponse {
    /// Backend accepted the streaming request; the body follows
    Opened { request_id: u64 },
    /// Stream `session` event
    Session { session_id: String, request_id: u64 },
    /// Stream `token` event
    Token { text: String, request_id: u64 },
    /// Stream `content` event
    Content { text: String, request_id: u64 },
    /// Stream `done` event
    Done { request_id: u64 },
    /// Stream `error` event
    StreamError { message: String, request_id: u64 },
    /// The streaming transport ended normally
    Complete { request_id: u64 },
    /// Non-streaming reply
    Reply {
        content: String,
        session_id: Option<String>,
        request_id: u64,
    },
    /// Network, HTTP or decoding failure
    Failed { message: String, request_id: u64 },
    /// The request was cancelled
    Cancelled { request_id: u64 },
}

impl ChatResponse {
    pub fn request_id(&self) -> u64 {
        match self {
            ChatResponse::Opened { request_id }
            | ChatResponse::Session { request_id, .. }
            | ChatResponse::Token { request_id, .. }
            | ChatResponse::Content { request_id, .. }
            | ChatResponse::Done { request_id }
            | ChatResponse::StreamError { request_id, .. }
            | ChatResponse::Complete { request_id }
            | ChatResponse::Reply { request_id, .. }
            | ChatResponse::Failed { request_id, .. }
            | ChatResponse::Cancelled { request_id } => *request_id,
        }
    }
}

/// How the in-flight request is being answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Streaming,
    Single,
}

/// Result of `ChatState::submit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input, nothing happened
    Ignored,
    /// Controller was busy; the query went to the back of the queue
    Queued,
    /// Request handed to the worker
    Dispatched,
    /// No worker to hand it to; an error message was appended instead
    Rejected,
}

/// Chat session state
pub struct ChatState {
    /// Whether the chat surface is open
    pub open: bool,
    /// Ordered message log
    pub messages: Vec<Message>,
    /// Pending input text
    pub input: String,
    /// Conversation id assigned by the backend
    pub session_id: Option<String>,
    /// A request is in flight
    pub loading: bool,
    /// A streamed answer is being received
    pub streaming: bool,
    /// Use the streaming endpoint for non-selection queries
    pub use_streaming: bool,
    /// Number of retrieved passages the backend should use
    pub top_k: u32,
    /// Reader background sent with every query
    pub user_background: UserBackground,
    /// Queries submitted while busy
    pub queue: RequestQueue,
    /// Text selection affordance and context
    pub selection: SelectionBridge,
    /// Channel to send requests to the worker thread
    pub request_tx: Option<Sender<ChatRequest>>,
    /// Channel to receive responses from the worker thread
    pub response_rx: Option<Receiver<ChatResponse>>,
    /// Current request ID, incremented for each new request
    pub request_id: u64,
    /// ID of the currently in-flight request, if any
    pub in_flight_request_id: Option<u64>,
    /// Token that aborts the in-flight request
    pub current_cancel_token: Option<CancellationToken>,
    /// Mode of the in-flight request
    pub dispatch_mode: Option<DispatchMode>,
    /// Index of the assistant message receiving streamed tokens
    pub streaming_index: Option<usize>,
}

#[cfg(test)]
#[path = "chat_state_tests.rs"]
mod chat_state_tests;
