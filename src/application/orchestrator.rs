//! Orchestration facade over dispatch and analysis.
//!
//! One entry point for callers: generate the counterparty's next turn,
//! analyze a session transcript, or derive training suggestions. The facade
//! owns transcript bookkeeping (sequence numbering, role assignment) so
//! callers only hand over turns and scenario context.

use std::time::Duration;

use crate::application::dispatcher::{DispatchError, Dispatcher};
use crate::domain::analysis::{AnalysisResult, ConversationAnalyzer};
use crate::domain::conversation::{next_sequence_index, ScenarioContext, Turn};
use crate::ports::{ChatRequest, ChatResult};

/// Per-call knobs for turn generation.
///
/// Everything optional falls back to dispatcher or provider defaults.
#[derive(Debug, Clone)]
pub struct GenerateTurnOptions {
    /// Sampling temperature.
    pub temperature: f32,
    /// Upper bound on generated tokens, when the caller wants one.
    pub max_tokens: Option<u32>,
    /// Per-call deadline override.
    pub timeout: Option<Duration>,
}

impl Default for GenerateTurnOptions {
    fn default() -> Self {
        Self {
            temperature: ChatRequest::DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout: None,
        }
    }
}

/// Facade composing the dispatcher and the conversation analyzer.
pub struct Orchestrator {
    dispatcher: Dispatcher,
    analyzer: ConversationAnalyzer,
}

impl Orchestrator {
    /// Creates an orchestrator around a configured dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher,
            analyzer: ConversationAnalyzer::new(),
        }
    }

    /// Generates the counterparty's next turn for a session.
    ///
    /// The reply is appended-ready: it carries the counterparty role and the
    /// sequence index following the transcript's last turn. The raw dispatch
    /// result rides along so callers can record latency and token usage.
    pub async fn generate_turn(
        &self,
        turns: &[Turn],
        context: &ScenarioContext,
        model_id: &str,
        options: GenerateTurnOptions,
    ) -> Result<(Turn, ChatResult), DispatchError> {
        let mut request = ChatRequest::new(model_id, turns.to_vec())
            .with_context(context.clone())
            .with_temperature(options.temperature);
        if let Some(max_tokens) = options.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }
        if let Some(timeout) = options.timeout {
            request = request.with_timeout(timeout);
        }

        let result = self.dispatcher.dispatch(request).await?;

        let turn = Turn::counterparty(result.text.clone(), next_sequence_index(turns)).map_err(
            |e| DispatchError::ProviderMalformedResponse {
                model_id: model_id.to_string(),
                detail: e.to_string(),
            },
        )?;

        Ok((turn, result))
    }

    /// Analyzes a session transcript.
    pub fn analyze_session(&self, turns: &[Turn]) -> AnalysisResult {
        self.analyzer.analyze(turns)
    }

    /// Derives training suggestions for a transcript and target outcome.
    pub fn suggest_training(&self, turns: &[Turn], target_outcome: &str) -> Vec<String> {
        self.analyzer.suggest_training(turns, target_outcome)
    }
}
