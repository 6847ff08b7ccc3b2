//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! domain and the outside world. Adapters implement these ports.
//!
//! ## Chat Ports
//!
//! - `ChatProvider` - Port for AI text-generation providers
//! - `ChatRequest` / `ChatResult` - provider-neutral request and reply shapes
//! - `ProviderError` - adapter-level failure taxonomy

mod chat_provider;

pub use chat_provider::{
    ChatProvider, ChatRequest, ChatResult, ProviderError, ProviderInfo, ProviderRequest,
    ProviderReply,
};
