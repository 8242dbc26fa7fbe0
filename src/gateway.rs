//! Backend gateway
//!
//! Typed HTTP client for the textbook backend (RAG chat, selection Q&A, auth,
//! personalization, translation, health). Uses reqwest for HTTP and tokio for
//! the async runtime; streaming reads are cancelled via CancellationToken.

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::types::BackendConfig;

pub mod rag;
pub mod sse;
mod stream;

pub use rag::{ChatBody, ChatReply, SelectionAnswerBody, SelectionQueryBody, SendRoute};
pub use sse::{SseParser, StreamEvent};

/// Errors that can occur while talking to the backend
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// Could not build the HTTP client
    #[error("Backend not configured: {message}")]
    NotConfigured { message: String },

    /// Network error during the request or while reading the body
    #[error("Network error: {message}")]
    Network { message: String },

    /// Backend returned a non-2xx status
    #[error("HTTP error! status: {code}")]
    Api { code: u16, message: String },

    /// Failed to decode the response body
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Request was cancelled
    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            GatewayError::Parse {
                message: e.to_string(),
            }
        } else {
            GatewayError::Network {
                message: e.to_string(),
            }
        }
    }
}

/// Response of `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// HTTP client bound to one backend base path
///
/// Cloning is cheap; the underlying reqwest client shares its connection
/// pool and cookie jar.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a client for the given base path (e.g. `http://localhost:8000/api`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .user_agent(concat!("bookbot/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()
            .map_err(|e| GatewayError::NotConfigured {
                message: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client from the `[backend]` config section
    ///
    /// The `BOOKBOT_BACKEND_URL` environment variable wins over the file.
    pub fn from_config(config: &BackendConfig) -> Result<Self, GatewayError> {
        Self::new(config.resolve_url())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST a JSON body and decode a JSON response, failing on non-2xx
    pub(crate) async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, GatewayError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.client.post(self.endpoint(path)).json(body).send().await?;

        if !response.status().is_success() {
            let code = response.status().as_u16();
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GatewayError::Api { code, message });
        }

        response.json::<R>().await.map_err(|e| GatewayError::Parse {
            message: e.to_string(),
        })
    }

    /// POST a JSON body and return the status with whatever JSON came back
    ///
    /// Used by the auth forms, which read `detail` out of error bodies.
    /// A body that is not JSON comes back as `Value::Null`.
    pub(crate) async fn post_value<B>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(u16, serde_json::Value), GatewayError>
    where
        B: Serialize + ?Sized,
    {
        let response = self.client.post(self.endpoint(path)).json(body).send().await?;
        let status = response.status().as_u16();
        let bytes = response.bytes().await?;
        let value = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        Ok((status, value))
    }

    /// `GET /health`
    pub async fn health(&self) -> Result<HealthStatus, GatewayError> {
        let response = self.client.get(self.endpoint("/health")).send().await?;

        if !response.status().is_success() {
            return Err(GatewayError::Api {
                code: response.status().as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        response.json().await.map_err(|e| GatewayError::Parse {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod gateway_tests;
