//! Chat Provider Adapters.
//!
//! Implementations of the ChatProvider port, one per provider family.
//!
//! ## Available Adapters
//!
//! - `MockChatProvider` - Configurable mock/spy for testing
//! - `OpenAiProvider` - OpenAI-style chat completions API
//! - `AnthropicProvider` - Anthropic-style messages API
//!
//! Each adapter owns exactly two translations: the wire shape, and the
//! mapping from the domain's customer/counterparty roles onto the vendor's
//! role vocabulary. Latency measurement and family routing live in the
//! dispatcher.

mod anthropic_provider;
mod mock_provider;
mod openai_provider;

pub use anthropic_provider::{AnthropicConfig, AnthropicProvider};
pub use mock_provider::{MockChatProvider, MockReply};
pub use openai_provider::{OpenAiConfig, OpenAiProvider};
