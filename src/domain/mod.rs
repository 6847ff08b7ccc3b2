//! Domain layer - pure negotiation conversation and analysis logic.

pub mod analysis;
pub mod conversation;
pub mod foundation;
