//! Provider dispatch - routes chat requests to the matching provider family.
//!
//! The dispatcher selects an adapter by prefix match on the model identifier,
//! validates the request before any I/O, builds the system prompt, and times
//! the provider call itself so all providers are measured identically. It
//! never retries: retry and backoff policy belongs to the call site, which
//! knows whether it is serving a live chat or a batch job.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::adapters::ai::{AnthropicConfig, AnthropicProvider, OpenAiConfig, OpenAiProvider};
use crate::config::AiConfig;
use crate::domain::conversation::build_system_prompt;
use crate::ports::{ChatProvider, ChatRequest, ChatResult, ProviderError, ProviderRequest};

/// Caller-facing dispatch errors.
///
/// Every variant carries the model identifier so failures can be traced to a
/// provider without extra context. Validation errors (`InvalidRequest`,
/// `UnsupportedModel`) are raised before any network activity.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The model identifier matches no registered provider family.
    #[error("unsupported model '{model_id}': no provider family matches")]
    UnsupportedModel {
        /// The unmatched identifier.
        model_id: String,
    },

    /// The request violates the contract (temperature range, max_tokens).
    #[error("invalid request for '{model_id}': {reason}")]
    InvalidRequest {
        /// The requested model.
        model_id: String,
        /// What was out of contract.
        reason: String,
    },

    /// The provider did not answer: the call hit its deadline or the
    /// transport failed before a reply arrived.
    #[error("provider did not answer for '{model_id}': {cause}")]
    ProviderTimeout {
        /// The requested model.
        model_id: String,
        /// Timeout or transport details.
        cause: String,
    },

    /// Provider-reported rate limit.
    #[error("provider rate limited '{model_id}': retry after {retry_after_secs}s")]
    ProviderRateLimited {
        /// The requested model.
        model_id: String,
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// The provider rejected the configured credentials.
    #[error("provider rejected credentials for '{model_id}'")]
    ProviderAuthFailed {
        /// The requested model.
        model_id: String,
    },

    /// The provider reply was missing required fields; fatal to this call,
    /// never guessed or partially filled.
    #[error("provider returned malformed response for '{model_id}': {detail}")]
    ProviderMalformedResponse {
        /// The requested model.
        model_id: String,
        /// What was missing or undecodable.
        detail: String,
    },
}

impl DispatchError {
    /// Returns true if a caller-side retry could plausibly succeed.
    ///
    /// The dispatcher itself never retries; this only informs the caller's
    /// own policy.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DispatchError::ProviderTimeout { .. } | DispatchError::ProviderRateLimited { .. }
        )
    }

    fn from_provider(model_id: &str, err: ProviderError) -> Self {
        let model_id = model_id.to_string();
        match err {
            ProviderError::Timeout { .. } | ProviderError::ConnectionFailed { .. } => {
                DispatchError::ProviderTimeout {
                    model_id,
                    cause: err.to_string(),
                }
            }
            ProviderError::RateLimited { retry_after_secs } => {
                DispatchError::ProviderRateLimited {
                    model_id,
                    retry_after_secs,
                }
            }
            ProviderError::AuthFailed => DispatchError::ProviderAuthFailed { model_id },
            ProviderError::MalformedResponse { detail } => {
                DispatchError::ProviderMalformedResponse { model_id, detail }
            }
        }
    }
}

/// Routes provider-neutral chat requests to provider adapters.
///
/// Families are matched by model-identifier prefix in registration order;
/// adding a provider means registering another family, never branching inside
/// the dispatch path.
#[derive(Clone)]
pub struct Dispatcher {
    families: Vec<(String, Arc<dyn ChatProvider>)>,
    default_timeout: Duration,
}

impl Dispatcher {
    /// Deadline applied when a request carries no timeout override.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

    /// Creates a dispatcher with no registered families.
    pub fn new() -> Self {
        Self {
            families: Vec::new(),
            default_timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    /// Builds a dispatcher from AI configuration, registering only families
    /// with credentials: `gpt*` when an OpenAI key is present, `claude*` when
    /// an Anthropic key is present.
    pub fn from_config(config: &AiConfig) -> Self {
        let mut dispatcher = Self::new().with_default_timeout(config.timeout());

        if let Some(key) = config.openai_api_key.as_deref().filter(|k| !k.is_empty()) {
            dispatcher = dispatcher.register_family(
                "gpt",
                Arc::new(OpenAiProvider::new(
                    OpenAiConfig::new(key).with_timeout(config.timeout()),
                )),
            );
        }
        if let Some(key) = config
            .anthropic_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
        {
            dispatcher = dispatcher.register_family(
                "claude",
                Arc::new(AnthropicProvider::new(
                    AnthropicConfig::new(key).with_timeout(config.timeout()),
                )),
            );
        }

        dispatcher
    }

    /// Registers a provider family under a model-identifier prefix.
    pub fn register_family(
        mut self,
        prefix: impl Into<String>,
        provider: Arc<dyn ChatProvider>,
    ) -> Self {
        self.families.push((prefix.into(), provider));
        self
    }

    /// Sets the deadline used when a request carries no timeout override.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Returns the registered family prefixes, in match order.
    pub fn family_prefixes(&self) -> Vec<&str> {
        self.families.iter().map(|(p, _)| p.as_str()).collect()
    }

    /// Dispatches one chat request to the matching provider family.
    ///
    /// Validation happens before adapter selection, and selection before any
    /// network activity; latency is wall-clock time around the provider call
    /// as measured here, never trusted from the adapter. Dropping the
    /// returned future abandons the in-flight provider call without
    /// producing a result.
    pub async fn dispatch(&self, request: ChatRequest) -> Result<ChatResult, DispatchError> {
        request
            .validate()
            .map_err(|e| DispatchError::InvalidRequest {
                model_id: request.model_id.clone(),
                reason: e.to_string(),
            })?;

        let provider = self
            .families
            .iter()
            .find(|(prefix, _)| request.model_id.starts_with(prefix.as_str()))
            .map(|(_, provider)| Arc::clone(provider))
            .ok_or_else(|| DispatchError::UnsupportedModel {
                model_id: request.model_id.clone(),
            })?;

        let system_prompt = build_system_prompt(&request.context);
        let deadline = request.timeout.unwrap_or(self.default_timeout);
        let model_id = request.model_id.clone();

        let provider_request = ProviderRequest {
            model_id: request.model_id,
            system_prompt,
            turns: request.turns,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        tracing::debug!(model_id = %model_id, "dispatching chat request");
        let started = Instant::now();

        let reply = match tokio::time::timeout(deadline, provider.send(provider_request)).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(err)) => {
                tracing::warn!(model_id = %model_id, error = %err, "provider call failed");
                return Err(DispatchError::from_provider(&model_id, err));
            }
            Err(_) => {
                tracing::warn!(model_id = %model_id, ?deadline, "provider call hit deadline");
                return Err(DispatchError::ProviderTimeout {
                    model_id,
                    cause: format!("no reply within {:.1}s", deadline.as_secs_f64()),
                });
            }
        };

        let latency = started.elapsed();
        tracing::debug!(
            model_id = %model_id,
            latency_seconds = latency.as_secs_f64(),
            tokens = reply.tokens_consumed,
            "chat request completed"
        );

        Ok(ChatResult::from_reply(reply, latency))
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
