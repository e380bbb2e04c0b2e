use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{Span, info, warn};

use crate::config::LlmConfig;
use crate::conversation::Message;

use super::azure_openai::{AzureOpenAiBackend, AzureOpenAiSettings};
use super::deepseek::{DeepSeekBackend, DeepSeekSettings};
use super::gateway::{ChatBackend, ChatFuture};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    AzureOpenAi,
    DeepSeek,
}

const PROVIDER_ALIASES: &[(&str, ProviderKind)] = &[
    ("azure_openai", ProviderKind::AzureOpenAi),
    ("azure", ProviderKind::AzureOpenAi),
    ("openai", ProviderKind::AzureOpenAi),
    ("deepseek", ProviderKind::DeepSeek),
];

impl ProviderKind {
    pub const ALL: [ProviderKind; 2] = [ProviderKind::AzureOpenAi, ProviderKind::DeepSeek];

    /// Case-insensitive lookup over every known alias.
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        PROVIDER_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, kind)| *kind)
    }

    pub fn canonical_name(self) -> &'static str {
        match self {
            Self::AzureOpenAi => "azure_openai",
            Self::DeepSeek => "deepseek",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical_name())
    }
}

#[derive(Debug, Clone, Error)]
pub enum BackendConfigError {
    #[error("missing required env var {0}")]
    MissingVar(&'static str),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("no backend registered")]
    NotRegistered,
}

#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    #[error("unsupported llm provider: {0}")]
    UnknownProvider(String),
    #[error("llm provider {provider} is not configured: {reason}")]
    NotConfigured {
        provider: ProviderKind,
        reason: BackendConfigError,
    },
}

/// A resolved backend. Cheap to clone; carries no per-request state.
#[derive(Clone)]
pub struct ProviderHandle {
    kind: ProviderKind,
    backend: Arc<dyn ChatBackend>,
}

impl ProviderHandle {
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    pub fn display_name(&self) -> &str {
        self.backend.display_name()
    }

    pub fn chat<'a>(&'a self, history: &'a [Message]) -> ChatFuture<'a> {
        self.backend.chat(history)
    }
}

impl fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("kind", &self.kind)
            .field("display_name", &self.display_name())
            .finish()
    }
}

#[derive(Clone)]
enum BackendSlot {
    Ready(Arc<dyn ChatBackend>),
    Unconfigured(BackendConfigError),
}

/// Maps provider names to backends. Built once at startup and read-only
/// afterwards; a backend with missing settings stays registered as
/// unconfigured so `resolve` can report exactly what is missing without
/// touching the network.
pub struct ProviderRegistry {
    azure_openai: BackendSlot,
    deepseek: BackendSlot,
    log: Span,
}

impl ProviderRegistry {
    pub fn from_config(config: &LlmConfig, client: reqwest::Client, log: Span) -> Self {
        let azure_openai = match AzureOpenAiSettings::from_config(&config.azure_openai) {
            Ok(settings) => BackendSlot::Ready(Arc::new(AzureOpenAiBackend::new(
                settings,
                client.clone(),
            ))),
            Err(err) => BackendSlot::Unconfigured(err),
        };
        let deepseek = match DeepSeekSettings::from_config(&config.deepseek) {
            Ok(settings) => BackendSlot::Ready(Arc::new(DeepSeekBackend::new(settings, client))),
            Err(err) => BackendSlot::Unconfigured(err),
        };

        let registry = Self::with_slots(
            HashMap::from([
                (ProviderKind::AzureOpenAi, azure_openai),
                (ProviderKind::DeepSeek, deepseek),
            ]),
            log,
        );
        registry.log_availability();
        registry
    }

    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    fn with_slots(mut slots: HashMap<ProviderKind, BackendSlot>, log: Span) -> Self {
        let mut take = |kind: ProviderKind| {
            slots
                .remove(&kind)
                .unwrap_or(BackendSlot::Unconfigured(BackendConfigError::NotRegistered))
        };

        Self {
            azure_openai: take(ProviderKind::AzureOpenAi),
            deepseek: take(ProviderKind::DeepSeek),
            log,
        }
    }

    fn slot(&self, kind: ProviderKind) -> &BackendSlot {
        match kind {
            ProviderKind::AzureOpenAi => &self.azure_openai,
            ProviderKind::DeepSeek => &self.deepseek,
        }
    }

    pub fn resolve(&self, name: &str) -> Result<ProviderHandle, RegistryError> {
        let Some(kind) = ProviderKind::from_name(name) else {
            warn!(parent: &self.log, provider = name, "unsupported llm provider requested");
            return Err(RegistryError::UnknownProvider(name.to_string()));
        };
        self.resolve_kind(kind)
    }

    pub fn resolve_kind(&self, kind: ProviderKind) -> Result<ProviderHandle, RegistryError> {
        match self.slot(kind) {
            BackendSlot::Ready(backend) => Ok(ProviderHandle {
                kind,
                backend: Arc::clone(backend),
            }),
            BackendSlot::Unconfigured(reason) => {
                warn!(parent: &self.log, provider = %kind, reason = %reason, "llm provider is not configured");
                Err(RegistryError::NotConfigured {
                    provider: kind,
                    reason: reason.clone(),
                })
            }
        }
    }

    fn log_availability(&self) {
        for kind in ProviderKind::ALL {
            match self.slot(kind) {
                BackendSlot::Ready(backend) => {
                    info!(parent: &self.log, provider = %kind, display_name = backend.display_name(), "llm provider configured");
                }
                BackendSlot::Unconfigured(reason) => {
                    warn!(parent: &self.log, provider = %kind, reason = %reason, "llm provider unavailable");
                }
            }
        }
    }
}

#[derive(Default)]
pub struct ProviderRegistryBuilder {
    slots: HashMap<ProviderKind, BackendSlot>,
    log: Option<Span>,
}

impl ProviderRegistryBuilder {
    pub fn register(mut self, kind: ProviderKind, backend: Arc<dyn ChatBackend>) -> Self {
        self.slots.insert(kind, BackendSlot::Ready(backend));
        self
    }

    pub fn unconfigured(mut self, kind: ProviderKind, reason: BackendConfigError) -> Self {
        self.slots.insert(kind, BackendSlot::Unconfigured(reason));
        self
    }

    pub fn log(mut self, log: Span) -> Self {
        self.log = Some(log);
        self
    }

    pub fn build(self) -> ProviderRegistry {
        ProviderRegistry::with_slots(self.slots, self.log.unwrap_or_else(Span::none))
    }
}
