//! Adapters - Implementations of the ports for external services.

pub mod ai;
