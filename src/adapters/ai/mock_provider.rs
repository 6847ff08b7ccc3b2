//! Mock Chat Provider for testing.
//!
//! A configurable implementation of the ChatProvider port so dispatch and
//! orchestration can be exercised without real provider APIs.
//!
//! # Features
//!
//! - Pre-configured replies, consumed in order
//! - Error injection for failure-path testing
//! - Simulated latency for timeout and cancellation testing
//! - Call recording so tests can assert zero network activity
//!
//! # Example
//!
//! ```ignore
//! let provider = MockChatProvider::new()
//!     .with_reply("We could do 10% off.", 12)
//!     .with_delay(Duration::from_millis(50));
//!
//! let reply = provider.send(request).await?;
//! assert_eq!(provider.call_count(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::ports::{ChatProvider, ProviderError, ProviderInfo, ProviderReply, ProviderRequest};

/// A configured mock reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Return a successful reply.
    Success {
        text: String,
        tokens_consumed: u32,
    },
    /// Return an error.
    Error(ProviderError),
}

/// Mock chat provider for testing.
#[derive(Debug, Clone)]
pub struct MockChatProvider {
    /// Pre-configured replies (consumed in order).
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    /// Provider info to report.
    info: ProviderInfo,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<ProviderRequest>>>,
}

impl Default for MockChatProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful reply.
    pub fn with_reply(self, text: impl Into<String>, tokens_consumed: u32) -> Self {
        self.replies.lock().unwrap().push_back(MockReply::Success {
            text: text.into(),
            tokens_consumed,
        });
        self
    }

    /// Queues an error reply.
    pub fn with_error(self, error: ProviderError) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Error(error));
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Sets the provider info to report.
    pub fn with_provider_info(mut self, info: ProviderInfo) -> Self {
        self.info = info;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn recorded_calls(&self) -> Vec<ProviderRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Gets the next reply or a default.
    fn next_reply(&self) -> MockReply {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockReply::Success {
                text: "Mock counterparty reply".to_string(),
                tokens_consumed: 10,
            })
    }
}

#[async_trait]
impl ChatProvider for MockChatProvider {
    async fn send(&self, request: ProviderRequest) -> Result<ProviderReply, ProviderError> {
        let model_id = request.model_id.clone();
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_reply() {
            MockReply::Success {
                text,
                tokens_consumed,
            } => Ok(ProviderReply {
                text,
                provider_model_id: model_id,
                tokens_consumed,
            }),
            MockReply::Error(err) => Err(err),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::Turn;

    fn request(model_id: &str) -> ProviderRequest {
        ProviderRequest {
            model_id: model_id.to_string(),
            system_prompt: "Be a negotiator.".to_string(),
            turns: vec![Turn::customer("Hello", 0).unwrap()],
            temperature: 0.7,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn returns_configured_replies_in_order() {
        let provider = MockChatProvider::new()
            .with_reply("First", 1)
            .with_reply("Second", 2);

        let r1 = provider.send(request("mock-1")).await.unwrap();
        let r2 = provider.send(request("mock-1")).await.unwrap();

        assert_eq!(r1.text, "First");
        assert_eq!(r2.text, "Second");
        assert_eq!(r2.tokens_consumed, 2);
    }

    #[tokio::test]
    async fn returns_default_after_queue_exhausted() {
        let provider = MockChatProvider::new().with_reply("Only one", 1);

        provider.send(request("mock-1")).await.unwrap();
        let r = provider.send(request("mock-1")).await.unwrap();
        assert_eq!(r.text, "Mock counterparty reply");
    }

    #[tokio::test]
    async fn echoes_requested_model_id() {
        let provider = MockChatProvider::new().with_reply("hi", 1);
        let r = provider.send(request("mock-9")).await.unwrap();
        assert_eq!(r.provider_model_id, "mock-9");
    }

    #[tokio::test]
    async fn returns_configured_error() {
        let provider = MockChatProvider::new().with_error(ProviderError::AuthFailed);

        let result = provider.send(request("mock-1")).await;
        assert!(matches!(result, Err(ProviderError::AuthFailed)));
    }

    #[tokio::test]
    async fn tracks_calls() {
        let provider = MockChatProvider::new();
        assert_eq!(provider.call_count(), 0);

        provider.send(request("mock-1")).await.unwrap();
        provider.send(request("mock-2")).await.unwrap();

        assert_eq!(provider.call_count(), 2);
        assert_eq!(provider.recorded_calls()[1].model_id, "mock-2");
    }

    #[tokio::test]
    async fn respects_delay() {
        let provider = MockChatProvider::new()
            .with_reply("slow", 1)
            .with_delay(Duration::from_millis(50));

        let start = std::time::Instant::now();
        provider.send(request("mock-1")).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
