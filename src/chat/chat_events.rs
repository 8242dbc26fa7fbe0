//! Chat event handling
//!
//! Polls the worker's response channel and applies each response to the
//! chat state. The request queue is drained after every batch, so a query
//! queued while busy goes out as soon as the controller is idle.

use std::sync::mpsc::TryRecvError;

use super::chat_state::{ChatResponse, ChatState};
use super::message::Message;

/// Poll the response channel for incoming worker responses
///
/// This should be called in the main loop to process streaming responses.
/// Uses try_recv() for non-blocking polling.
/// Returns true if any state changed (responses received or disconnected).
pub fn poll_response_channel(chat_state: &mut ChatState) -> bool {
    if chat_state.response_rx.is_none() {
        return false;
    }

    let mut responses = Vec::new();
    let mut disconnected = false;

    if let Some(ref rx) = chat_state.response_rx {
        loop {
            match rx.try_recv() {
                Ok(response) => responses.push(response),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }
    }

    let had_responses = !responses.is_empty();

    for response in responses {
        process_response(chat_state, response);
    }

    if disconnected && chat_state.is_busy() {
        chat_state.close_streaming_message();
        chat_state
            .messages
            .push(Message::assistant("Error: Chat worker disconnected unexpectedly"));
        chat_state.finish_request();
    }

    chat_state.drain_queue();

    had_responses || disconnected
}

/// Process a single worker response
///
/// Responses whose request_id is older than the current one come from a
/// superseded request and are dropped, so a cancelled stream can never
/// touch the message log after a newer request started.
pub fn process_response(chat_state: &mut ChatState, response: ChatResponse) {
    let current_request_id = chat_state.current_request_id();
    let request_id = response.request_id();

    if request_id < current_request_id {
        log::debug!(
            "Ignoring stale response from request {} (current: {})",
            request_id,
            current_request_id
        );
        return;
    }

    match response {
        ChatResponse::Opened { .. } => chat_state.open_stream(),
        ChatResponse::Session { session_id, .. } => chat_state.set_session(session_id),
        ChatResponse::Token { text, .. } => chat_state.append_token(&text),
        ChatResponse::Content { text, .. } => chat_state.replace_content(text),
        ChatResponse::Done { .. } => chat_state.mark_done(),
        ChatResponse::StreamError { message, .. } => chat_state.set_stream_error(&message),
        ChatResponse::Complete { .. } => chat_state.finish_request(),
        ChatResponse::Reply {
            content,
            session_id,
            ..
        } => chat_state.apply_reply(content, session_id),
        ChatResponse::Failed { message, .. } => chat_state.fail_request(&message),
        ChatResponse::Cancelled { .. } => {
            log::debug!("Request {} cancelled via token", request_id);
            chat_state.finish_request();
        }
    }
}

#[cfg(test)]
#[path = "chat_events_tests.rs"]
mod chat_events_tests;
