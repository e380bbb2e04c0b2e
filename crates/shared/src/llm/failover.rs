use std::collections::HashMap;

use super::gateway::{ProviderError, ProviderErrorKind};
use super::registry::ProviderKind;

/// Declarative single-hop failover: `{primary -> fallback}`, applied only
/// when the primary reports a rate limit. A fallback is never itself failed
/// over.
#[derive(Debug, Clone, Default)]
pub struct FailoverPolicy {
    routes: HashMap<ProviderKind, ProviderKind>,
}

impl FailoverPolicy {
    pub fn standard() -> Self {
        Self::default().with_route(ProviderKind::AzureOpenAi, ProviderKind::DeepSeek)
    }

    pub fn with_route(mut self, primary: ProviderKind, fallback: ProviderKind) -> Self {
        if primary != fallback {
            self.routes.insert(primary, fallback);
        }
        self
    }

    pub fn fallback_for(&self, failed: ProviderKind, err: &ProviderError) -> Option<ProviderKind> {
        if err.kind() != ProviderErrorKind::RateLimited {
            return None;
        }
        self.routes.get(&failed).copied()
    }
}
