use crate::config::AzureOpenAiConfig;
use crate::conversation::Message;

use super::gateway::{ChatBackend, ChatFuture};
use super::registry::BackendConfigError;
use super::wire::{ChatCompletionBody, execute_chat_completion};

pub const AZURE_OPENAI_DISPLAY_NAME: &str = "Azure OpenAI";

#[derive(Debug, Clone)]
pub struct AzureOpenAiSettings {
    pub api_key: String,
    pub endpoint: String,
    pub deployment: String,
    pub api_version: String,
}

impl AzureOpenAiSettings {
    pub fn from_config(config: &AzureOpenAiConfig) -> Result<Self, BackendConfigError> {
        let api_key = config
            .api_key
            .clone()
            .ok_or(BackendConfigError::MissingVar("AZURE_OPENAI_API_KEY"))?;
        let endpoint = config
            .endpoint
            .clone()
            .ok_or(BackendConfigError::MissingVar("AZURE_OPENAI_ENDPOINT"))?;
        let deployment = config
            .deployment
            .clone()
            .ok_or(BackendConfigError::MissingVar("AZURE_OPENAI_DEPLOYMENT"))?;
        if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
            return Err(BackendConfigError::InvalidConfiguration(
                "AZURE_OPENAI_ENDPOINT must start with http:// or https://".to_string(),
            ));
        }

        Ok(Self {
            api_key,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            deployment,
            api_version: config.api_version.clone(),
        })
    }

    fn chat_completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint, self.deployment, self.api_version
        )
    }
}

/// Azure OpenAI deployment. Authenticates with the `api-key` header; the
/// model is implied by the deployment, so the body carries none.
#[derive(Clone)]
pub struct AzureOpenAiBackend {
    client: reqwest::Client,
    settings: AzureOpenAiSettings,
}

impl AzureOpenAiBackend {
    pub fn new(settings: AzureOpenAiSettings, client: reqwest::Client) -> Self {
        Self { client, settings }
    }
}

impl ChatBackend for AzureOpenAiBackend {
    fn chat<'a>(&'a self, history: &'a [Message]) -> ChatFuture<'a> {
        Box::pin(async move {
            let request = self
                .client
                .post(self.settings.chat_completions_url())
                .header("api-key", &self.settings.api_key)
                .json(&ChatCompletionBody::new(None, history));
            execute_chat_completion(request).await
        })
    }

    fn display_name(&self) -> &str {
        AZURE_OPENAI_DISPLAY_NAME
    }
}
