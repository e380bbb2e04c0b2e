use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

use crate::conversation::Message;

pub type ChatFuture<'a> = Pin<Box<dyn Future<Output = Result<String, ProviderError>> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    RateLimited,
    Other,
}

#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("llm provider rejected the request with too many requests: {0}")]
    RateLimited(String),
    #[error("llm provider request timed out")]
    Timeout,
    #[error("llm provider request failed: {0}")]
    Failed(String),
    #[error("llm provider returned an invalid payload: {0}")]
    InvalidPayload(String),
}

impl ProviderError {
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            Self::RateLimited(_) => ProviderErrorKind::RateLimited,
            Self::Timeout | Self::Failed(_) | Self::InvalidPayload(_) => ProviderErrorKind::Other,
        }
    }
}

/// A chat-completion backend. Implementations issue exactly one outbound
/// call per `chat` invocation and hold no state beyond their configuration.
pub trait ChatBackend: Send + Sync {
    fn chat<'a>(&'a self, history: &'a [Message]) -> ChatFuture<'a>;

    fn display_name(&self) -> &str;
}
