//! Foundation value objects shared across the domain.

mod errors;
mod timestamp;

pub use errors::ValidationError;
pub use timestamp::Timestamp;
