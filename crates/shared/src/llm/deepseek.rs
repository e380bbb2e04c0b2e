use crate::config::DeepSeekConfig;
use crate::conversation::Message;

use super::gateway::{ChatBackend, ChatFuture};
use super::registry::BackendConfigError;
use super::wire::{ChatCompletionBody, execute_chat_completion};

pub const DEEPSEEK_DISPLAY_NAME: &str = "DeepSeek";

#[derive(Debug, Clone)]
pub struct DeepSeekSettings {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
}

impl DeepSeekSettings {
    pub fn from_config(config: &DeepSeekConfig) -> Result<Self, BackendConfigError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(BackendConfigError::MissingVar("DEEPSEEK_API_KEY"))?;
        if !config.endpoint.starts_with("http://") && !config.endpoint.starts_with("https://") {
            return Err(BackendConfigError::InvalidConfiguration(
                "DEEPSEEK_API_ENDPOINT must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
        })
    }

    fn chat_completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.endpoint)
    }
}

#[derive(Clone)]
pub struct DeepSeekBackend {
    client: reqwest::Client,
    settings: DeepSeekSettings,
}

impl DeepSeekBackend {
    pub fn new(settings: DeepSeekSettings, client: reqwest::Client) -> Self {
        Self { client, settings }
    }
}

impl ChatBackend for DeepSeekBackend {
    fn chat<'a>(&'a self, history: &'a [Message]) -> ChatFuture<'a> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.settings.chat_completions_url())
                .bearer_auth(&self.settings.api_key)
                .json(&ChatCompletionBody::new(
                    Some(self.settings.model.as_str()),
                    history,
                ));
            execute_chat_completion(request).await
        })
    }

    fn display_name(&self) -> &str {
        DEEPSEEK_DISPLAY_NAME
    }
}
