use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use crate::config_env::{
    optional_trimmed_env, parse_positive_u64_env, parse_u64_env, trimmed_env_or,
};
use crate::llm::ProviderKind;

const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_RETENTION_SECONDS: u64 = 24 * 60 * 60;
const DEFAULT_SESSION_SWEEP_INTERVAL_SECONDS: u64 = 6 * 60 * 60;
const DEFAULT_LLM_REQUEST_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_FETCH_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_AZURE_OPENAI_API_VERSION: &str = "2023-05-15";
const DEFAULT_DEEPSEEK_API_ENDPOINT: &str = "https://api.deepseek.com";
const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub session_retention_seconds: u64,
    pub session_sweep_interval_seconds: u64,
    pub default_provider: ProviderKind,
    pub llm_request_timeout_ms: u64,
    pub fetch_timeout_ms: u64,
    pub llm: LlmConfig,
}

/// Raw per-backend settings. Values stay optional here; a backend whose
/// required values are missing is reported by the provider registry when it
/// is resolved, not at startup.
#[derive(Debug, Clone, Default)]
pub struct LlmConfig {
    pub azure_openai: AzureOpenAiConfig,
    pub deepseek: DeepSeekConfig,
}

#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub deployment: Option<String>,
    pub api_version: String,
}

impl Default for AzureOpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: None,
            deployment: None,
            api_version: DEFAULT_AZURE_OPENAI_API_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeepSeekConfig {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
}

impl Default for DeepSeekConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_DEEPSEEK_API_ENDPOINT.to_string(),
            model: DEFAULT_DEEPSEEK_MODEL.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
}

/// Loads `.env` into the process environment. Returns `Ok(false)` when no
/// file exists so the caller can decide how loudly to report it.
pub fn load_dotenv() -> Result<bool, ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(true),
        Err(err) if err.not_found() => Ok(false),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let default_provider_name = trimmed_env_or("LLM_DEFAULT_PROVIDER", "azure_openai");
        let default_provider = ProviderKind::from_name(&default_provider_name).ok_or_else(|| {
            ConfigError::InvalidConfiguration(format!(
                "LLM_DEFAULT_PROVIDER names an unknown provider '{default_provider_name}'"
            ))
        })?;

        Ok(Self {
            bind_addr: parse_bind_addr()?,
            session_retention_seconds: parse_positive_u64_env(
                "SESSION_RETENTION_SECONDS",
                DEFAULT_SESSION_RETENTION_SECONDS,
            )?,
            session_sweep_interval_seconds: parse_positive_u64_env(
                "SESSION_SWEEP_INTERVAL_SECONDS",
                DEFAULT_SESSION_SWEEP_INTERVAL_SECONDS,
            )?,
            default_provider,
            llm_request_timeout_ms: parse_positive_u64_env(
                "LLM_REQUEST_TIMEOUT_MS",
                DEFAULT_LLM_REQUEST_TIMEOUT_MS,
            )?,
            fetch_timeout_ms: parse_positive_u64_env("FETCH_TIMEOUT_MS", DEFAULT_FETCH_TIMEOUT_MS)?,
            llm: LlmConfig::from_env(),
        })
    }

    pub fn session_retention(&self) -> Duration {
        Duration::from_secs(self.session_retention_seconds)
    }

    pub fn session_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session_sweep_interval_seconds)
    }

    pub fn llm_request_timeout(&self) -> Duration {
        Duration::from_millis(self.llm_request_timeout_ms)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self {
            azure_openai: AzureOpenAiConfig {
                api_key: optional_trimmed_env("AZURE_OPENAI_API_KEY"),
                endpoint: optional_trimmed_env("AZURE_OPENAI_ENDPOINT"),
                deployment: optional_trimmed_env("AZURE_OPENAI_DEPLOYMENT"),
                api_version: trimmed_env_or(
                    "AZURE_OPENAI_API_VERSION",
                    DEFAULT_AZURE_OPENAI_API_VERSION,
                ),
            },
            deepseek: DeepSeekConfig {
                api_key: optional_trimmed_env("DEEPSEEK_API_KEY"),
                endpoint: trimmed_env_or("DEEPSEEK_API_ENDPOINT", DEFAULT_DEEPSEEK_API_ENDPOINT),
                model: trimmed_env_or("DEEPSEEK_MODEL", DEFAULT_DEEPSEEK_MODEL),
            },
        }
    }
}

fn parse_bind_addr() -> Result<SocketAddr, ConfigError> {
    let raw = match optional_trimmed_env("API_BIND_ADDR") {
        Some(raw) => raw,
        None => {
            let port = parse_u64_env("PORT", u64::from(DEFAULT_PORT))?;
            format!("{DEFAULT_BIND_HOST}:{port}")
        }
    };

    raw.parse::<SocketAddr>().map_err(|_| {
        ConfigError::InvalidConfiguration(format!("API_BIND_ADDR '{raw}' is not a socket address"))
    })
}
