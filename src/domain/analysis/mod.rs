//! Conversation analysis - negotiation signals extracted from transcripts.
//!
//! Everything here is advisory. Scores are heuristic estimates used to curate
//! the training dataset; they are never written back into the turn sequence.

mod analyzer;
mod sentiment;
mod tactics;

pub use analyzer::{AnalysisResult, ConversationAnalyzer};
pub use sentiment::score_sentiment;
pub use tactics::Tactic;
