#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use api_server::http::{AppState, build_router};
use shared::config::{AzureOpenAiConfig, DeepSeekConfig, LlmConfig};
use shared::conversation::{ConversationOrchestrator, SessionStore};
use shared::fetch::HttpContentFetcher;
use shared::llm::{ProviderKind, ProviderRegistry};
use tracing::Span;

use super::upstream::MockUpstream;

pub struct TestApp {
    pub router: axum::Router,
    pub store: SessionStore,
}

pub fn build_test_app(upstream: &MockUpstream) -> TestApp {
    build_test_app_with_llm(llm_config_for(upstream))
}

pub fn build_test_app_with_llm(llm: LlmConfig) -> TestApp {
    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("http client should initialize");
    let fetcher = Arc::new(
        HttpContentFetcher::new(Duration::from_secs(5), Span::none())
            .expect("page fetcher should initialize"),
    );
    let registry = Arc::new(ProviderRegistry::from_config(&llm, http_client, Span::none()));
    let store = SessionStore::new(Span::none());
    let orchestrator = ConversationOrchestrator::new(
        store.clone(),
        registry,
        fetcher.clone(),
        ProviderKind::AzureOpenAi,
        Span::none(),
    );

    let router = build_router(AppState {
        orchestrator,
        store: store.clone(),
        fetcher,
    });

    TestApp { router, store }
}

pub fn llm_config_for(upstream: &MockUpstream) -> LlmConfig {
    LlmConfig {
        azure_openai: AzureOpenAiConfig {
            api_key: Some("test-azure-key".to_string()),
            endpoint: Some(upstream.base_url.clone()),
            deployment: Some("reader".to_string()),
            ..AzureOpenAiConfig::default()
        },
        deepseek: DeepSeekConfig {
            api_key: Some("test-deepseek-key".to_string()),
            endpoint: upstream.base_url.clone(),
            ..DeepSeekConfig::default()
        },
    }
}
