//! Streaming chat over `/rag/chat/stream`
//!
//! Reads the SSE body incrementally and forwards each decoded event to the
//! chat controller as a `ChatResponse`, racing every read against the
//! request's CancellationToken.

use std::sync::mpsc::Sender;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;

use super::rag::{CHAT_STREAM_PATH, ChatBody};
use super::sse::{SseParser, StreamEvent};
use super::{BackendClient, GatewayError};
use crate::chat::chat_state::ChatResponse;

impl BackendClient {
    /// Stream a chat answer with cancellation support
    ///
    /// Sends `ChatResponse::Opened` once the backend accepted the request,
    /// then one response per decoded event.
    ///
    /// # Returns
    /// * `Ok(())` - Stream ended (or the controller went away)
    /// * `Err(GatewayError::Cancelled)` - Token was cancelled
    /// * `Err(GatewayError::*)` - Transport or HTTP failure
    pub async fn stream_with_cancel(
        &self,
        body: &ChatBody,
        request_id: u64,
        cancel_token: CancellationToken,
        response_tx: Sender<ChatResponse>,
    ) -> Result<(), GatewayError> {
        if cancel_token.is_cancelled() {
            return Err(GatewayError::Cancelled);
        }

        let request = self
            .client
            .post(self.endpoint(CHAT_STREAM_PATH))
            .header("Accept", "text/event-stream")
            .json(body)
            .send();

        let response = tokio::select! {
            biased;

            _ = cancel_token.cancelled() => {
                log::debug!("Request {} cancelled before response", request_id);
                return Err(GatewayError::Cancelled);
            }

            response = request => response?,
        };

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::Api { code, message });
        }

        if response_tx.send(ChatResponse::Opened { request_id }).is_err() {
            return Ok(());
        }

        let mut stream = response.bytes_stream();
        let mut sse_parser = SseParser::new();

        loop {
            tokio::select! {
                biased;

                _ = cancel_token.cancelled() => {
                    log::debug!("Request {} cancelled during streaming", request_id);
                    return Err(GatewayError::Cancelled);
                }

                chunk = stream.next() => {
                    match chunk {
                        Some(Ok(bytes)) => {
                            for event in sse_parser.parse_chunk(&bytes) {
                                if !forward(&response_tx, event, request_id) {
                                    // Controller disconnected
                                    return Ok(());
                                }
                            }
                        }
                        Some(Err(e)) => {
                            return Err(GatewayError::Network {
                                message: e.to_string(),
                            });
                        }
                        None => break,
                    }
                }
            }
        }

        if let Some(event) = sse_parser.finish() {
            forward(&response_tx, event, request_id);
        }

        Ok(())
    }
}

/// Send one event to the controller; false once the receiver is gone
fn forward(response_tx: &Sender<ChatResponse>, event: StreamEvent, request_id: u64) -> bool {
    let response = match event {
        StreamEvent::Session(session_id) => ChatResponse::Session {
            session_id,
            request_id,
        },
        StreamEvent::Token(text) => ChatResponse::Token { text, request_id },
        StreamEvent::Content(text) => ChatResponse::Content { text, request_id },
        StreamEvent::Done => ChatResponse::Done { request_id },
        StreamEvent::Error(message) => ChatResponse::StreamError {
            message,
            request_id,
        },
    };
    response_tx.send(response).is_ok()
}
