//! Chat Worker Thread
//!
//! Handles backend requests in a background thread so the main loop never
//! blocks on the network. Receives requests via channel, makes HTTP calls,
//! and streams responses back to the thread that owns `ChatState`.
//!
//! Uses a current-thread tokio runtime for async HTTP streaming with
//! cancellation support.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, Sender};

use tokio_util::sync::CancellationToken;

use super::chat_state::{ChatRequest, ChatResponse};
use crate::config::types::BackendConfig;
use crate::gateway::{BackendClient, ChatBody, GatewayError, SendRoute};

/// Spawn the chat worker thread
///
/// Creates a background thread with a tokio runtime that:
/// 1. Listens for requests on the request channel
/// 2. Makes async HTTP calls to the backend with cancellation support
/// 3. Streams responses back via the response channel
pub fn spawn_worker(
    config: &BackendConfig,
    request_rx: Receiver<ChatRequest>,
    response_tx: Sender<ChatResponse>,
) -> std::thread::JoinHandle<()> {
    let client_result = BackendClient::from_config(config);

    std::thread::spawn(move || {
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    log::error!("Failed to create chat worker runtime: {}", e);
                    return;
                }
            };

            rt.block_on(worker_loop(client_result, request_rx, response_tx));
        }));

        if let Err(e) = result {
            let panic_msg = if let Some(s) = e.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = e.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            log::error!("Chat worker thread panicked: {}", panic_msg);
        }
    })
}

/// Main async worker loop - processes requests until the channel is closed
///
/// Requests are handled one at a time; a new request only starts after the
/// previous one returned (normally, with an error, or through cancellation).
pub(crate) async fn worker_loop(
    client_result: Result<BackendClient, GatewayError>,
    request_rx: Receiver<ChatRequest>,
    response_tx: Sender<ChatResponse>,
) {
    let client = match client_result {
        Ok(client) => Some(client),
        Err(e) => {
            log::error!("Chat backend unavailable: {}", e);
            None
        }
    };

    // Blocking recv() is fine on this dedicated thread
    while let Ok(request) = request_rx.recv() {
        match request {
            ChatRequest::Stream {
                body,
                request_id,
                cancel_token,
            } => {
                handle_stream(&client, &body, request_id, cancel_token, &response_tx).await;
            }
            ChatRequest::Send {
                route,
                request_id,
                cancel_token,
            } => {
                handle_send(&client, &route, request_id, cancel_token, &response_tx).await;
            }
        }
    }

    log::debug!("Chat worker shutting down");
}

/// Handle a streaming chat request
///
/// Always finishes with exactly one of `Complete`, `Cancelled` or `Failed`.
async fn handle_stream(
    client: &Option<BackendClient>,
    body: &ChatBody,
    request_id: u64,
    cancel_token: CancellationToken,
    response_tx: &Sender<ChatResponse>,
) {
    if cancel_token.is_cancelled() {
        let _ = response_tx.send(ChatResponse::Cancelled { request_id });
        return;
    }

    let Some(client) = client else {
        let _ = response_tx.send(not_configured(request_id));
        return;
    };

    let terminal = match client
        .stream_with_cancel(body, request_id, cancel_token, response_tx.clone())
        .await
    {
        Ok(()) => ChatResponse::Complete { request_id },
        Err(GatewayError::Cancelled) => ChatResponse::Cancelled { request_id },
        Err(e) => ChatResponse::Failed {
            message: e.to_string(),
            request_id,
        },
    };
    let _ = response_tx.send(terminal);
}

/// Handle a non-streaming chat request
///
/// Always finishes with exactly one of `Reply`, `Cancelled` or `Failed`.
async fn handle_send(
    client: &Option<BackendClient>,
    route: &SendRoute,
    request_id: u64,
    cancel_token: CancellationToken,
    response_tx: &Sender<ChatResponse>,
) {
    if cancel_token.is_cancelled() {
        let _ = response_tx.send(ChatResponse::Cancelled { request_id });
        return;
    }

    let Some(client) = client else {
        let _ = response_tx.send(not_configured(request_id));
        return;
    };

    let response = tokio::select! {
        biased;

        _ = cancel_token.cancelled() => ChatResponse::Cancelled { request_id },

        result = client.send(route) => match result {
            Ok(reply) => ChatResponse::Reply {
                content: reply.content,
                session_id: reply.session_id,
                request_id,
            },
            Err(e) => ChatResponse::Failed {
                message: e.to_string(),
                request_id,
            },
        },
    };
    let _ = response_tx.send(response);
}

fn not_configured(request_id: u64) -> ChatResponse {
    ChatResponse::Failed {
        message: "Backend not configured. Set [backend] url in ~/.config/bookbot/config.toml or BOOKBOT_BACKEND_URL".to_string(),
        request_id,
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod worker_tests;
