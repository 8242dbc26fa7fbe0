//! Chat response handling
//!
//! Handles request dispatch over the worker channel, cancellation, and the
//! per-event mutations of the streaming assistant message.

use std::sync::mpsc::{Receiver, Sender};

use tokio_util::sync::CancellationToken;

use super::{ChatRequest, ChatResponse, ChatState, DispatchMode};
use crate::chat::message::Message;

impl ChatState {
    /// Set the channel handles for communication with the worker thread
    pub fn set_channels(
        &mut self,
        request_tx: Sender<ChatRequest>,
        response_rx: Receiver<ChatResponse>,
    ) {
        self.request_tx = Some(request_tx);
        self.response_rx = Some(response_rx);
    }

    /// Get the current request ID
    ///
    /// Responses carrying an older ID belong to a superseded request.
    pub fn current_request_id(&self) -> u64 {
        self.request_id
    }

    /// Send a request through the channel
    ///
    /// This method:
    /// 1. Cancels any existing in-flight request first (last request wins)
    /// 2. Increments the request ID
    /// 3. Creates and stores a new CancellationToken
    /// 4. Sends the request built by `build`
    ///
    /// Returns false if there is no worker channel or the worker is gone.
    pub(crate) fn send_request<F>(&mut self, mode: DispatchMode, build: F) -> bool
    where
        F: FnOnce(u64, CancellationToken) -> ChatRequest,
    {
        if self.request_tx.is_none() {
            return false;
        }

        self.cancel_in_flight_request();

        self.request_id = self.request_id.wrapping_add(1);
        let request_id = self.request_id;
        let cancel_token = CancellationToken::new();
        self.current_cancel_token = Some(cancel_token.clone());
        self.in_flight_request_id = Some(request_id);
        self.dispatch_mode = Some(mode);

        if let Some(ref tx) = self.request_tx
            && tx.send(build(request_id, cancel_token)).is_ok()
        {
            log::debug!("Sent {:?} request {}", mode, request_id);
            return true;
        }

        self.current_cancel_token = None;
        self.in_flight_request_id = None;
        false
    }

    /// Cancel any in-flight request
    ///
    /// Calls cancel() on the CancellationToken so the worker aborts the HTTP
    /// exchange, then clears the token and in-flight tracking.
    /// Returns true if there was an in-flight request to cancel.
    pub fn cancel_in_flight_request(&mut self) -> bool {
        if let Some(token) = self.current_cancel_token.take() {
            log::debug!(
                "Cancelling in-flight request {:?}",
                self.in_flight_request_id
            );
            token.cancel();
            self.in_flight_request_id = None;
            return true;
        }
        false
    }

    pub fn has_in_flight_request(&self) -> bool {
        self.in_flight_request_id.is_some()
    }

    /// Backend accepted the stream: add the assistant message tokens go into
    pub(crate) fn open_stream(&mut self) {
        self.close_streaming_message();
        self.messages.push(Message::streaming_assistant());
        self.streaming_index = Some(self.messages.len() - 1);
        self.streaming = true;
    }

    fn streaming_message(&mut self) -> Option<&mut Message> {
        let index = self.streaming_index?;
        self.messages.get_mut(index).filter(|m| m.is_streaming)
    }

    /// Append a streamed token to the running answer
    pub fn append_token(&mut self, text: &str) {
        if let Some(message) = self.streaming_message() {
            message.content.push_str(text);
        }
    }

    /// Replace the running answer wholesale and close it
    pub fn replace_content(&mut self, text: String) {
        if let Some(message) = self.streaming_message() {
            message.content = text;
        }
        self.close_streaming_message();
    }

    /// Close the running answer without touching its text
    pub fn mark_done(&mut self) {
        self.close_streaming_message();
    }

    /// Backend reported an error mid-stream
    pub fn set_stream_error(&mut self, message: &str) {
        self.replace_content(format!("Error: {message}"));
    }

    /// Remember the session the backend assigned
    pub fn set_session(&mut self, session_id: String) {
        if self.session_id.as_deref() != Some(session_id.as_str()) {
            log::debug!("Session set to {}", session_id);
        }
        self.session_id = Some(session_id);
    }

    /// Non-streaming answer arrived
    pub(crate) fn apply_reply(&mut self, content: String, session_id: Option<String>) {
        if let Some(session_id) = session_id {
            self.set_session(session_id);
        }
        self.messages.push(Message::assistant(content));
        self.finish_request();
    }
}
