//! RAG chat routes: request bodies and the non-streaming calls

use serde::{Deserialize, Serialize};

use super::{BackendClient, GatewayError};
use crate::chat::message::UserBackground;

pub const CHAT_STREAM_PATH: &str = "/rag/chat/stream";
pub const CHAT_PATH: &str = "/rag/chat";
pub const SELECTION_QUERY_PATH: &str = "/rag/selection-query";
pub const ANSWER_FROM_SELECTION_PATH: &str = "/rag/answer-from-selection";

/// Fallback reply text when the backend answers with neither field
pub const EMPTY_REPLY: &str = "No response received";

/// Body of `/rag/chat` and `/rag/chat/stream`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatBody {
    pub message: String,
    pub session_id: Option<String>,
    pub user_background: UserBackground,
    pub top_k: u32,
}

/// Body of `/rag/selection-query`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionQueryBody {
    pub selected_text: String,
    pub question: String,
    pub user_background: UserBackground,
    pub top_k: u32,
}

/// Body of `/rag/answer-from-selection` (strict mode, no retrieval)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionAnswerBody {
    pub selected_text: String,
    pub question: String,
    pub user_background: UserBackground,
}

/// Which non-streaming operation to call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendRoute {
    Chat(ChatBody),
    SelectionQuery(SelectionQueryBody),
    AnswerFromSelection(SelectionAnswerBody),
}

impl SendRoute {
    pub fn path(&self) -> &'static str {
        match self {
            SendRoute::Chat(_) => CHAT_PATH,
            SendRoute::SelectionQuery(_) => SELECTION_QUERY_PATH,
            SendRoute::AnswerFromSelection(_) => ANSWER_FROM_SELECTION_PATH,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawReply {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    answer: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

/// Normalized non-streaming reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub content: String,
    pub session_id: Option<String>,
}

impl From<RawReply> for ChatReply {
    fn from(raw: RawReply) -> Self {
        let content = [raw.message, raw.answer]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or_else(|| EMPTY_REPLY.to_string());

        ChatReply {
            content,
            session_id: raw.session_id.filter(|s| !s.is_empty()),
        }
    }
}

impl BackendClient {
    /// Call one of the non-streaming chat operations
    pub async fn send(&self, route: &SendRoute) -> Result<ChatReply, GatewayError> {
        let raw: RawReply = match route {
            SendRoute::Chat(body) => self.post_json(route.path(), body).await?,
            SendRoute::SelectionQuery(body) => self.post_json(route.path(), body).await?,
            SendRoute::AnswerFromSelection(body) => self.post_json(route.path(), body).await?,
        };
        Ok(raw.into())
    }
}
