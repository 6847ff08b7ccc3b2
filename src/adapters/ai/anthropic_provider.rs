//! Anthropic Provider - ChatProvider implementation for Anthropic's messages API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AnthropicConfig::new(api_key)
//!     .with_base_url("https://api.anthropic.com");
//!
//! let provider = AnthropicProvider::new(config);
//! ```
//!
//! # Token accounting
//!
//! Anthropic reports input and output tokens separately; this adapter sums
//! them into one total to match the provider-neutral reply shape. That is a
//! deliberate semantic narrowing: callers that need the split must read it
//! from the provider directly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::domain::conversation::Role;
use crate::ports::{ChatProvider, ProviderError, ProviderInfo, ProviderReply, ProviderRequest};

/// Anthropic API version header value.
const ANTHROPIC_API_VERSION: &str = "2023-06-01";

/// Configuration for the Anthropic provider.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Base URL for the API (default: https://api.anthropic.com).
    pub base_url: String,
    /// HTTP client timeout.
    pub timeout: Duration,
}

impl AnthropicConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            base_url: "https://api.anthropic.com".to_string(),
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

/// Anthropic messages API provider.
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
}

impl AnthropicProvider {
    /// Model reported when the caller leaves selection to the dispatcher.
    const DEFAULT_MODEL: &'static str = "claude-3-5-sonnet-latest";

    /// The messages API makes `max_tokens` mandatory. When the caller passes
    /// none, this bound applies instead of propagating an unbounded request.
    pub const DEFAULT_MAX_TOKENS: u32 = 1024;

    /// Creates a new Anthropic provider with the given configuration.
    pub fn new(config: AnthropicConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the messages endpoint URL.
    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.config.base_url)
    }

    /// Converts a provider-neutral request to Anthropic's format.
    ///
    /// The system prompt travels in the top-level `system` field rather than
    /// as a message; customer turns map to "user" and counterparty turns to
    /// "assistant".
    fn to_anthropic_request(&self, request: &ProviderRequest) -> AnthropicRequest {
        let messages = request
            .turns
            .iter()
            .map(|turn| AnthropicMessage {
                role: match turn.role() {
                    Role::Customer => "user",
                    Role::Counterparty => "assistant",
                }
                .to_string(),
                content: turn.text().to_string(),
            })
            .collect();

        AnthropicRequest {
            model: request.model_id.clone(),
            messages,
            system: request.system_prompt.clone(),
            max_tokens: request.max_tokens.unwrap_or(Self::DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
        }
    }

    async fn send_request(&self, request: &ProviderRequest) -> Result<Response, ProviderError> {
        let anthropic_request = self.to_anthropic_request(request);

        self.client
            .post(self.messages_url())
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", ANTHROPIC_API_VERSION)
            .header("Content-Type", "application/json")
            .json(&anthropic_request)
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
                // Anthropic rate limit windows tend to run longer.
                let retry_after = parse_retry_after(&error_body, 60);
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

    /// Parses a messages response into the normalized reply.
    async fn parse_response(&self, response: Response) -> Result<ProviderReply, ProviderError> {
        let response = self.handle_response_status(response).await?;

        let anthropic_response: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(format!("Failed to parse response: {}", e)))?;

        reply_from_response(anthropic_response)
    }
}

/// Builds the normalized reply from a decoded response body.
fn reply_from_response(response: AnthropicResponse) -> Result<ProviderReply, ProviderError> {
    let text = response
        .content
        .into_iter()
        .filter_map(|block| {
            if block.block_type == "text" {
                block.text
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("");

    if text.trim().is_empty() {
        return Err(ProviderError::malformed("No text content in response"));
    }

    // Semantic narrowing: input and output counts are summed into one total
    // (see module docs).
    let tokens_consumed = response.usage.input_tokens + response.usage.output_tokens;

    Ok(ProviderReply {
        text,
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
impl ChatProvider for AnthropicProvider {
    async fn send(&self, request: ProviderRequest) -> Result<ProviderReply, ProviderError> {
        let response = self.send_request(&request).await?;
        self.parse_response(response).await
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("anthropic", Self::DEFAULT_MODEL)
    }
}

// ----- Anthropic API Types -----

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    system: String,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize, Deserialize)]
struct AnthropicMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    model: String,
    content: Vec<ContentBlock>,
    usage: AnthropicUsage,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicUsage {
    input_tokens: u32,
    output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Turn;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new(AnthropicConfig::new("test-key"))
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            model_id: "claude-3-haiku-20240307".to_string(),
            system_prompt: "Act as a business representative.".to_string(),
            turns: vec![
                Turn::customer("Is the price negotiable?", 0).unwrap(),
                Turn::counterparty("Within reason, yes.", 1).unwrap(),
            ],
            temperature: 0.7,
            max_tokens: None,
        }
    }

    #[test]
    fn config_builder_works() {
        let config = AnthropicConfig::new("test-key")
            .with_base_url("https://custom.api.com")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(config.base_url, "https://custom.api.com");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.api_key(), "test-key");
    }

    #[test]
    fn request_supplies_default_max_tokens() {
        let wire = provider().to_anthropic_request(&request());
        assert_eq!(wire.max_tokens, AnthropicProvider::DEFAULT_MAX_TOKENS);
    }

    #[test]
    fn request_honors_caller_max_tokens() {
        let mut req = request();
        req.max_tokens = Some(333);
        let wire = provider().to_anthropic_request(&req);
        assert_eq!(wire.max_tokens, 333);
    }

    #[test]
    fn request_maps_roles_and_keeps_system_separate() {
        let wire = provider().to_anthropic_request(&request());

        assert_eq!(wire.system, "Act as a business representative.");
        assert_eq!(wire.messages.len(), 2);
        assert_eq!(wire.messages[0].role, "user");
        assert_eq!(wire.messages[1].role, "assistant");
    }

    #[test]
    fn reply_sums_input_and_output_tokens() {
        let body = r#"{
            "model": "claude-3-haiku-20240307",
            "content": [{"type": "text", "text": "Happy to help."}],
            "usage": {"input_tokens": 40, "output_tokens": 8}
        }"#;
        let response: AnthropicResponse = serde_json::from_str(body).unwrap();
        let reply = reply_from_response(response).unwrap();

        assert_eq!(reply.tokens_consumed, 48);
        assert_eq!(reply.text, "Happy to help.");
    }

    #[test]
    fn reply_joins_multiple_text_blocks() {
        let body = r#"{
            "model": "claude-3-haiku-20240307",
            "content": [
                {"type": "text", "text": "First."},
                {"type": "tool_use", "text": null},
                {"type": "text", "text": " Second."}
            ],
            "usage": {"input_tokens": 1, "output_tokens": 1}
        }"#;
        let response: AnthropicResponse = serde_json::from_str(body).unwrap();
        let reply = reply_from_response(response).unwrap();
        assert_eq!(reply.text, "First. Second.");
    }

    #[test]
    fn reply_without_text_is_malformed() {
        let body = r#"{
            "model": "claude-3-haiku-20240307",
            "content": [],
            "usage": {"input_tokens": 1, "output_tokens": 0}
        }"#;
        let response: AnthropicResponse = serde_json::from_str(body).unwrap();
        assert!(matches!(
            reply_from_response(response),
            Err(ProviderError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn parse_retry_after_default_is_sixty() {
        let body = r#"{"error":{"message":"Rate limit exceeded"}}"#;
        assert_eq!(parse_retry_after(body, 60), 60);
    }

    #[test]
    fn provider_info_names_family() {
        let info = provider().provider_info();
        assert_eq!(info.name, "anthropic");
    }
}
