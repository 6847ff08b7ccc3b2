//! Application layer - dispatch and orchestration.
//!
//! The [`Orchestrator`] facade is the only surface external collaborators
//! call; it composes the [`Dispatcher`] for turn generation and the
//! conversation analyzer for insight extraction.

mod dispatcher;
mod orchestrator;

pub use dispatcher::{DispatchError, Dispatcher};
pub use orchestrator::{GenerateTurnOptions, Orchestrator};
