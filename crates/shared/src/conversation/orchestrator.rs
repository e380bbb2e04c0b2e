use std::sync::Arc;

use thiserror::Error;
use tracing::{Span, debug, info, warn};

use crate::fetch::{ContentFetcher, FetchError};
use crate::llm::{
    FailoverPolicy, ProviderError, ProviderHandle, ProviderKind, ProviderRegistry, RegistryError,
};

use super::message::Message;
use super::prompts::seed_messages;
use super::store::{Session, SessionStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTurnRequest {
    pub url: Option<String>,
    pub message: String,
    pub model: Option<String>,
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurnReply {
    pub reply: String,
    pub conversation_id: String,
    /// Display name of the backend that produced `reply`.
    pub provider: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Configuration,
    Fetch,
    Provider,
}

#[derive(Debug, Clone, Error)]
pub enum ChatError {
    #[error("url is required to start a new conversation")]
    MissingUrl,
    #[error("message is required")]
    MissingMessage,
    #[error("conversation not found: {0}")]
    SessionNotFound(String),
    #[error(transparent)]
    Configuration(#[from] RegistryError),
    #[error("failed to fetch page content: {0}")]
    Fetch(#[from] FetchError),
    #[error("llm provider {provider} failed: {source}")]
    Provider {
        provider: ProviderKind,
        source: ProviderError,
    },
    #[error(
        "llm provider {primary} was rate limited ({primary_error}) and fallback {fallback} failed: {fallback_error}"
    )]
    FailoverFailed {
        primary: ProviderKind,
        primary_error: ProviderError,
        fallback: ProviderKind,
        fallback_error: Box<ChatError>,
    },
}

impl ChatError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingUrl | Self::MissingMessage => ErrorCategory::Validation,
            Self::SessionNotFound(_) => ErrorCategory::NotFound,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Fetch(_) => ErrorCategory::Fetch,
            Self::Provider { .. } | Self::FailoverFailed { .. } => ErrorCategory::Provider,
        }
    }
}

/// Drives one chat turn: session lookup or creation, history seeding, the
/// provider call with its single failover hop, and persistence of both sides
/// of the exchange.
#[derive(Clone)]
pub struct ConversationOrchestrator {
    store: SessionStore,
    registry: Arc<ProviderRegistry>,
    fetcher: Arc<dyn ContentFetcher>,
    failover: FailoverPolicy,
    default_provider: ProviderKind,
    log: Span,
}

impl ConversationOrchestrator {
    pub fn new(
        store: SessionStore,
        registry: Arc<ProviderRegistry>,
        fetcher: Arc<dyn ContentFetcher>,
        default_provider: ProviderKind,
        log: Span,
    ) -> Self {
        Self {
            store,
            registry,
            fetcher,
            failover: FailoverPolicy::standard(),
            default_provider,
            log,
        }
    }

    pub async fn handle_turn(&self, request: ChatTurnRequest) -> Result<ChatTurnReply, ChatError> {
        if request.message.trim().is_empty() {
            return Err(ChatError::MissingMessage);
        }
        let conversation_id = non_empty(request.conversation_id.as_deref());
        let url = non_empty(request.url.as_deref());
        if conversation_id.is_none() && url.is_none() {
            return Err(ChatError::MissingUrl);
        }

        let provider = self.resolve_provider(non_empty(request.model.as_deref()))?;

        let session = match conversation_id {
            Some(id) => self
                .store
                .get(id)
                .ok_or_else(|| ChatError::SessionNotFound(id.to_string()))?,
            None => self.start_session(url.unwrap_or_default()).await?,
        };

        let mut history = self
            .store
            .seed_if_empty(
                &session.id,
                seed_messages(&session.source_url, &session.source_content),
            )
            .ok_or_else(|| ChatError::SessionNotFound(session.id.clone()))?;

        let user_message = Message::user(request.message.as_str());
        if !self.store.append_message(&session.id, user_message.clone()) {
            return Err(ChatError::SessionNotFound(session.id));
        }
        history.push(user_message);

        debug!(
            parent: &self.log,
            session_id = %session.id,
            provider = %provider.kind(),
            history_len = history.len(),
            "invoking llm provider"
        );
        let (reply, answered_by) = self.invoke_with_failover(provider, &history).await?;

        if !self
            .store
            .append_message(&session.id, Message::assistant(reply.clone()))
        {
            warn!(parent: &self.log, session_id = %session.id, "session vanished before reply was persisted");
            return Err(ChatError::SessionNotFound(session.id));
        }

        info!(
            parent: &self.log,
            session_id = %session.id,
            provider = %answered_by.kind(),
            "chat turn completed"
        );

        Ok(ChatTurnReply {
            reply,
            conversation_id: session.id,
            provider: answered_by.display_name().to_string(),
        })
    }

    fn resolve_provider(&self, model: Option<&str>) -> Result<ProviderHandle, ChatError> {
        let handle = match model {
            Some(name) => self.registry.resolve(name)?,
            None => self.registry.resolve_kind(self.default_provider)?,
        };
        Ok(handle)
    }

    async fn start_session(&self, url: &str) -> Result<Session, ChatError> {
        let page = self.fetcher.fetch(url).await.inspect_err(|err| {
            warn!(parent: &self.log, url, error = %err, "page fetch failed, no session created");
        })?;
        if page.content.trim().is_empty() {
            warn!(parent: &self.log, url, "fetched page has no readable content, no session created");
            return Err(FetchError::NoContent.into());
        }

        let session = self.store.create(&page.url, &page.content);
        info!(parent: &self.log, session_id = %session.id, source_url = %page.url, "conversation started");
        Ok(session)
    }

    async fn invoke_with_failover(
        &self,
        primary: ProviderHandle,
        history: &[Message],
    ) -> Result<(String, ProviderHandle), ChatError> {
        let primary_result = primary.chat(history).await;
        let primary_error = match primary_result {
            Ok(reply) => return Ok((reply, primary)),
            Err(err) => err,
        };

        let Some(fallback_kind) = self.failover.fallback_for(primary.kind(), &primary_error) else {
            warn!(parent: &self.log, provider = %primary.kind(), error = %primary_error, "llm provider failed");
            return Err(ChatError::Provider {
                provider: primary.kind(),
                source: primary_error,
            });
        };

        warn!(
            parent: &self.log,
            provider = %primary.kind(),
            fallback = %fallback_kind,
            error = %primary_error,
            "llm provider rate limited, failing over"
        );

        let failover_failed = |fallback_error: ChatError| ChatError::FailoverFailed {
            primary: primary.kind(),
            primary_error: primary_error.clone(),
            fallback: fallback_kind,
            fallback_error: Box::new(fallback_error),
        };

        let fallback = self
            .registry
            .resolve_kind(fallback_kind)
            .map_err(|err| failover_failed(ChatError::Configuration(err)))?;

        let fallback_result = fallback.chat(history).await;
        match fallback_result {
            Ok(reply) => Ok((reply, fallback)),
            Err(err) => {
                warn!(parent: &self.log, provider = %fallback_kind, error = %err, "fallback llm provider failed");
                Err(failover_failed(ChatError::Provider {
                    provider: fallback_kind,
                    source: err,
                }))
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
