use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::gateway::ProviderError;
use crate::conversation::Message;

pub(crate) const MAX_TOKENS: u32 = 2000;
pub(crate) const TEMPERATURE: f64 = 0.7;

const RATE_LIMIT_ERROR_CODES: &[&str] = &["429", "rate_limit_exceeded", "too_many_requests"];

/// Request body shared by the OpenAI-compatible chat completion endpoints.
#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) model: Option<&'a str>,
    pub(crate) messages: &'a [Message],
    pub(crate) max_tokens: u32,
    pub(crate) temperature: f64,
}

impl<'a> ChatCompletionBody<'a> {
    pub(crate) fn new(model: Option<&'a str>, messages: &'a [Message]) -> Self {
        Self {
            model,
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
    error: Option<ProviderErrorDetails>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: Option<ProviderErrorDetails>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorDetails {
    code: Option<Value>,
    message: Option<String>,
}

impl ProviderErrorDetails {
    fn code(&self) -> String {
        match &self.code {
            Some(Value::String(code)) => code.clone(),
            Some(Value::Number(code)) => code.to_string(),
            _ => "unknown".to_string(),
        }
    }
}

/// Sends a prepared completion request and extracts the first choice's
/// text. A 429 status, or an error body carrying a rate-limit code, becomes
/// `ProviderError::RateLimited`; everything else is terminal.
pub(crate) async fn execute_chat_completion(
    request: reqwest::RequestBuilder,
) -> Result<String, ProviderError> {
    let response = request.send().await.map_err(|err| {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Failed("request_unavailable".to_string())
        }
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|err| {
        if err.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::InvalidPayload("response_body_read_failed".to_string())
        }
    })?;

    if !status.is_success() {
        return Err(error_for_status(status, &body));
    }

    parse_chat_completion(&body)
}

pub(crate) fn error_for_status(status: StatusCode, body: &str) -> ProviderError {
    let details = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error);
    let code = details
        .as_ref()
        .map(ProviderErrorDetails::code)
        .unwrap_or_else(|| "unknown".to_string());
    let message = details
        .and_then(|details| details.message)
        .filter(|message| !message.trim().is_empty());
    let detail = match message {
        Some(message) => format!("status={} code={code} {message}", status.as_u16()),
        None => format!("status={} code={code}", status.as_u16()),
    };

    if status == StatusCode::TOO_MANY_REQUESTS || is_rate_limit_code(&code) {
        ProviderError::RateLimited(detail)
    } else {
        ProviderError::Failed(detail)
    }
}

pub(crate) fn parse_chat_completion(body: &str) -> Result<String, ProviderError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body).map_err(|_| {
        ProviderError::InvalidPayload("response_json_parse_failed".to_string())
    })?;

    if let Some(details) = parsed.error {
        let code = details.code();
        let message = details.message.unwrap_or_default();
        if is_rate_limit_code(&code) {
            return Err(ProviderError::RateLimited(format!("code={code} {message}")));
        }
        return Err(ProviderError::Failed(format!("code={code} {message}")));
    }

    parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidPayload("missing_choice".to_string()))?
        .message
        .content
        .ok_or_else(|| ProviderError::InvalidPayload("missing_content".to_string()))
}

fn is_rate_limit_code(code: &str) -> bool {
    RATE_LIMIT_ERROR_CODES
        .iter()
        .any(|candidate| code.eq_ignore_ascii_case(candidate))
}
