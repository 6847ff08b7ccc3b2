//! OpenAI Provider - ChatProvider implementation for OpenAI-style APIs.
//!
//! Speaks the chat completions wire shape used by OpenAI and compatible
//! gateways.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiConfig::new(api_key)
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let provider = OpenAiProvider::new(config);
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::domain::conversation::Role;
use crate::ports::{ChatProvider, ProviderError, ProviderInfo, ProviderReply, ProviderRequest};

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// HTTP client timeout.
    pub timeout: Duration,
}

impl OpenAiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://api.openai.com/v1".to_string(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the HTTP client timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI chat completions provider.
pub struct OpenAiProvider {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    /// Model reported when the caller leaves selection to the dispatcher.
    const DEFAULT_MODEL: &'static str = "gpt-4o";

    /// Creates a new OpenAI provider with the given configuration.
    pub fn new(config: OpenAiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts a provider-neutral request to OpenAI's format.
    ///
    /// The system prompt becomes the leading system message; customer turns
    /// map to "user" and counterparty turns to "assistant".
    fn to_openai_request(&self, request: &ProviderRequest) -> OpenAiRequest {
        let mut messages = vec![OpenAiMessage {
            role: "system".to_string(),
            content: request.system_prompt.clone(),
        }];

        for turn in &request.turns {
            messages.push(OpenAiMessage {
                role: match turn.role() {
                    Role::Customer => "user",
                    Role::Counterparty => "assistant",
                }
                .to_string(),
                content: turn.text().to_string(),
            });
        }

        OpenAiRequest {
            model: request.model_id.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }

    async fn send_request(&self, request: &ProviderRequest) -> Result<Response, ProviderError> {
        let openai_request = self.to_openai_request(request);

        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    ProviderError::connection(format!("Connection failed: {}", e))
                } else {
                    ProviderError::connection(e.to_string())
                }
            })
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(&self, response: Response) -> Result<Response, ProviderError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();

        match status.as_u16() {
            401 | 403 => Err(ProviderError::AuthFailed),
            429 => {
                let retry_after = parse_retry_after(&error_body, 30);
                Err(ProviderError::RateLimited {
                    retry_after_secs: retry_after,
                })
            }
            _ => Err(ProviderError::connection(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Parses a completion response into the normalized reply.
    async fn parse_response(&self, response: Response) -> Result<ProviderReply, ProviderError> {
        let response = self.handle_response_status(response).await?;

        let openai_response: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("Failed to parse response: {}", e)))?;

        reply_from_response(openai_response)
    }
}

/// Builds the normalized reply from a decoded response body.
fn reply_from_response(response: OpenAiResponse) -> Result<ProviderReply, ProviderError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::malformed("No choices in response"))?;

    if choice.message.content.trim().is_empty() {
        return Err(ProviderError::malformed("Empty message content"));
    }

    // OpenAI reports a combined total directly; no summing needed.
    let tokens_consumed = response.usage.map(|u| u.total_tokens).unwrap_or(0);

    Ok(ProviderReply {
        text: choice.message.content,
        provider_model_id: response.model,
        tokens_consumed,
    })
}

/// Parses a "try again in Xs" hint out of an error body.
fn parse_retry_after(error_body: &str, default_secs: u32) -> u32 {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(error_body) {
        if let Some(msg) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            if let Some(idx) = msg.find("try again in ") {
                let rest = &msg[idx + 13..];
                let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
                if let Ok(secs) = digits.parse::<u32>() {
                    return secs;
                }
            }
        }
    }
    default_secs
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    async fn send(&self, request: ProviderRequest) -> Result<ProviderReply, ProviderError> {
        let response = self.send_request(&request).await?;
        self.parse_response(response).await
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("openai", Self::DEFAULT_MODEL)
    }
}

// ----- OpenAI API Types -----

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: String,
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAiUsage {
    #[allow(dead_code)]
    prompt_tokens: u32,
    #[allow(dead_code)]
    completion_tokens: u32,
    total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Turn;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new(OpenAiConfig::new("test-key"))
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            model_id: "gpt-4o".to_string(),
            system_prompt: "Act as a business representative.".to_string(),
            turns: vec![
                Turn::customer("Can I get a discount?", 0).unwrap(),
                Turn::counterparty("What did you have in mind?", 1).unwrap(),
            ],
            temperature: 0.7,
            max_tokens: Some(200),
        }
    }

    #[test]
    fn config_builder_works() {
        let config = OpenAiConfig::new("test-key")
            .with_base_url("https://custom.api.com/v1")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.base_url, "https://custom.api.com/v1");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn request_maps_roles_to_user_and_assistant() {
        let wire = provider().to_openai_request(&request());

        assert_eq!(wire.messages[0].role, "system");
        assert_eq!(wire.messages[1].role, "user");
        assert_eq!(wire.messages[1].content, "Can I get a discount?");
        assert_eq!(wire.messages[2].role, "assistant");
    }

    #[test]
    fn request_embeds_system_prompt_first() {
        let wire = provider().to_openai_request(&request());
        assert_eq!(wire.messages[0].content, "Act as a business representative.");
    }

    #[test]
    fn request_passes_max_tokens_through_untouched() {
        let wire = provider().to_openai_request(&request());
        assert_eq!(wire.max_tokens, Some(200));

        let mut no_limit = request();
        no_limit.max_tokens = None;
        let wire = provider().to_openai_request(&no_limit);
        assert_eq!(wire.max_tokens, None);
    }

    #[test]
    fn request_uses_model_from_request_not_config() {
        let mut req = request();
        req.model_id = "gpt-3.5-turbo".to_string();
        let wire = provider().to_openai_request(&req);
        assert_eq!(wire.model, "gpt-3.5-turbo");
    }

    #[test]
    fn reply_uses_reported_total_tokens() {
        let body = r#"{
            "model": "gpt-4o-2024-05-13",
            "choices": [{"message": {"role": "assistant", "content": "ok"}}],
            "usage": {"prompt_tokens": 9, "completion_tokens": 3, "total_tokens": 12}
        }"#;
        let response: OpenAiResponse = serde_json::from_str(body).unwrap();
        let reply = reply_from_response(response).unwrap();

        assert_eq!(reply.text, "ok");
        assert_eq!(reply.provider_model_id, "gpt-4o-2024-05-13");
        assert_eq!(reply.tokens_consumed, 12);
    }

    #[test]
    fn reply_without_choices_is_malformed() {
        let body = r#"{"model": "gpt-4o", "choices": [], "usage": null}"#;
        let response: OpenAiResponse = serde_json::from_str(body).unwrap();
        let result = reply_from_response(response);
        assert!(matches!(
            result,
            Err(ProviderError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn reply_with_empty_content_is_malformed() {
        let body = r#"{
            "model": "gpt-4o",
            "choices": [{"message": {"role": "assistant", "content": "  "}}],
            "usage": null
        }"#;
        let response: OpenAiResponse = serde_json::from_str(body).unwrap();
        assert!(reply_from_response(response).is_err());
    }

    #[test]
    fn parse_retry_after_extracts_hint() {
        let body = r#"{"error":{"message":"Rate limit reached. Please try again in 17s."}}"#;
        assert_eq!(parse_retry_after(body, 30), 17);
    }

    #[test]
    fn parse_retry_after_falls_back_to_default() {
        let body = r#"{"error":{"message":"Rate limit reached."}}"#;
        assert_eq!(parse_retry_after(body, 30), 30);
    }

    #[test]
    fn provider_info_names_family() {
        let info = provider().provider_info();
        assert_eq!(info.name, "openai");
    }
}
