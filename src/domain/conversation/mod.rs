//! Conversation domain - turns, scenario context, and prompt building.
//!
//! A negotiation session is an ordered sequence of [`Turn`]s exchanged between
//! a customer and the business counterparty. The sequence itself is owned by
//! the external session store; this module only defines the shape of a turn
//! and the pure functions that operate on scenario context.

mod context;
mod prompt;
mod turn;

pub use context::ScenarioContext;
pub use prompt::build_system_prompt;
pub use turn::{Role, Turn, TurnId};

pub(crate) use turn::next_sequence_index;
