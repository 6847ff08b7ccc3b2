//! Chat Provider Port - Interface for AI text-generation providers.
//!
//! This port abstracts all interactions with AI providers (OpenAI, Anthropic,
//! future local models), so the dispatcher can route requests without coupling
//! to any vendor's wire shape.
//!
//! # Design
//!
//! - Provider-neutral turn format; adapters own role-vocabulary mapping
//! - One normalized token total per reply, regardless of how the provider
//!   reports usage
//! - Error kinds for the failure modes a caller can act on (rate limit,
//!   credential, timeout, malformed body)

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::conversation::{ScenarioContext, Turn};
use crate::domain::foundation::ValidationError;

/// Port for AI text-generation providers.
///
/// Implementations translate the provider-neutral [`ProviderRequest`] into
/// the vendor's API shape and normalize the reply. Adapters never measure
/// latency; the dispatcher times all providers identically.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends one chat request and returns the normalized reply.
    async fn send(&self, request: ProviderRequest) -> Result<ProviderReply, ProviderError>;

    /// Returns provider information (family name, default model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Provider-neutral chat request, validated before dispatch.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Model identifier, also used for provider-family selection.
    pub model_id: String,
    /// Ordered transcript so far.
    pub turns: Vec<Turn>,
    /// Scenario context for the system prompt.
    pub context: ScenarioContext,
    /// Sampling temperature in [0.0, 2.0].
    pub temperature: f32,
    /// Maximum tokens to generate; providers that require a value supply
    /// their own default when this is `None`.
    pub max_tokens: Option<u32>,
    /// Per-dispatch deadline override; the dispatcher default applies when
    /// `None`.
    pub timeout: Option<Duration>,
}

impl ChatRequest {
    /// Default sampling temperature.
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Creates a request for the given model and transcript.
    pub fn new(model_id: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            model_id: model_id.into(),
            turns,
            context: ScenarioContext::default(),
            temperature: Self::DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout: None,
        }
    }

    /// Sets the scenario context.
    pub fn with_context(mut self, context: ScenarioContext) -> Self {
        self.context = context;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Overrides the per-dispatch deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Checks the request against the contract: temperature in [0.0, 2.0]
    /// and, when present, a positive `max_tokens`.
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::out_of_range(
                "temperature",
                0.0,
                2.0,
                self.temperature as f64,
            ));
        }
        if self.max_tokens == Some(0) {
            return Err(ValidationError::invalid_format(
                "max_tokens",
                "must be a positive integer",
            ));
        }
        if self.model_id.trim().is_empty() {
            return Err(ValidationError::empty_field("model_id"));
        }
        Ok(())
    }
}

/// Request handed to a provider adapter after validation and prompt building.
///
/// The system prompt travels alongside the turns; each adapter embeds it as
/// the leading instruction in whatever form its wire shape requires.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Exact model to invoke.
    pub model_id: String,
    /// System instruction built from the scenario context.
    pub system_prompt: String,
    /// Ordered transcript so far.
    pub turns: Vec<Turn>,
    /// Sampling temperature, already validated.
    pub temperature: f32,
    /// Maximum tokens to generate, if the caller supplied one.
    pub max_tokens: Option<u32>,
}

/// Normalized reply from a provider adapter.
///
/// Carries everything except latency, which the dispatcher measures itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReply {
    /// Generated counterparty text.
    pub text: String,
    /// The model identifier the provider reports having used.
    pub provider_model_id: String,
    /// Total tokens consumed by this exchange.
    pub tokens_consumed: u32,
}

/// Provider-neutral chat result, produced exactly once per successful
/// dispatch and never partially populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    /// Generated counterparty text.
    pub text: String,
    /// The model that produced the text, as reported by the provider.
    pub provider_model_id: String,
    /// Total tokens consumed by this exchange.
    pub tokens_consumed: u32,
    /// Wall-clock latency of the provider call, measured by the dispatcher.
    pub latency_seconds: f64,
}

impl ChatResult {
    /// Combines a provider reply with the dispatcher's timing measurement.
    pub fn from_reply(reply: ProviderReply, latency: Duration) -> Self {
        Self {
            text: reply.text,
            provider_model_id: reply.provider_model_id,
            tokens_consumed: reply.tokens_consumed,
            latency_seconds: latency.as_secs_f64(),
        }
    }
}

/// Provider information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider family name (e.g. "openai", "anthropic").
    pub name: String,
    /// Model used when a request does not name one explicitly.
    pub default_model: String,
}

impl ProviderInfo {
    /// Creates new provider info.
    pub fn new(name: impl Into<String>, default_model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default_model: default_model.into(),
        }
    }
}

/// Adapter-level provider errors.
///
/// The dispatcher wraps these into its caller-facing taxonomy with the model
/// identifier attached; adapters report only what the transport told them.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The provider did not answer within the configured deadline.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// The connection could not be established or broke mid-request.
    #[error("connection failed: {message}")]
    ConnectionFailed {
        /// Transport error details.
        message: String,
    },

    /// Provider-reported rate limit.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// API key rejected.
    #[error("authentication failed")]
    AuthFailed,

    /// Response body was missing required fields or undecodable.
    #[error("malformed response: {detail}")]
    MalformedResponse {
        /// What was missing or undecodable.
        detail: String,
    },
}

impl ProviderError {
    /// Creates a connection failure error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedResponse {
            detail: detail.into(),
        }
    }
}
