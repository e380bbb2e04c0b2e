use serde::{Deserialize, Serialize};

use crate::conversation::{ChatTurnReply, ChatTurnRequest, Message};
use crate::fetch::PageContent;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResponse {
    pub success: bool,
    pub title: String,
    pub content: String,
    pub url: String,
}

impl From<PageContent> for ParseResponse {
    fn from(page: PageContent) -> Self {
        Self {
            success: true,
            title: page.title,
            content: page.content,
            url: page.url,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

impl From<ChatRequest> for ChatTurnRequest {
    fn from(request: ChatRequest) -> Self {
        Self {
            url: request.url,
            message: request.message,
            model: request.model,
            conversation_id: request.conversation_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    pub response: String,
    pub conversation_id: String,
    pub model: String,
}

impl From<ChatTurnReply> for ChatResponse {
    fn from(reply: ChatTurnReply) -> Self {
        Self {
            success: true,
            response: reply.reply,
            conversation_id: reply.conversation_id,
            model: reply.provider,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationListResponse {
    pub success: bool,
    pub conversation_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub success: bool,
    pub conversation_id: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteConversationResponse {
    pub success: bool,
    pub conversation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}
