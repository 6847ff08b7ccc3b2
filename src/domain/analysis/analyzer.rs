//! Post-hoc transcript analysis.
//!
//! Consumes a completed transcript and produces the negotiation signals the
//! dataset curator uses to label exchanges: per-role sentiment, detected
//! tactics, a success estimate, and coaching recommendations.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::{score_sentiment, Tactic};
use crate::domain::conversation::{Role, Turn};

/// Negotiation signals extracted from one transcript.
///
/// Advisory output only: nothing here is written back into the turn sequence,
/// and `success_probability` is a heuristic estimate of how the negotiation
/// is trending, not a guarantee about its outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Mean sentiment per role in [-1, 1]. Roles absent from the transcript
    /// have no entry.
    pub sentiment_by_role: HashMap<Role, f64>,

    /// Every tactic observed anywhere in the transcript.
    pub tactics_detected: BTreeSet<Tactic>,

    /// Heuristic success estimate in [0, 1]. An empty transcript scores 0.0.
    pub success_probability: f64,

    /// Coaching recommendations, most important first.
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    /// The neutral result for an empty transcript.
    pub fn neutral() -> Self {
        Self {
            sentiment_by_role: HashMap::new(),
            tactics_detected: BTreeSet::new(),
            success_probability: 0.0,
            recommendations: Vec::new(),
        }
    }
}

/// Analyzer for completed negotiation transcripts.
///
/// Pure function of the transcript: no network, no shared state, safe to run
/// concurrently with live dispatches.
#[derive(Debug, Clone, Default)]
pub struct ConversationAnalyzer;

impl ConversationAnalyzer {
    /// Creates a new analyzer.
    pub fn new() -> Self {
        Self
    }

    /// Extracts negotiation signals from a transcript.
    ///
    /// # Edge Cases
    ///
    /// - Empty transcript: returns [`AnalysisResult::neutral`], never errors
    /// - Single-role transcript: sentiment only for the present role
    /// - Whitespace-only turns: excluded from sentiment and tactic detection
    pub fn analyze(&self, turns: &[Turn]) -> AnalysisResult {
        let spoken: Vec<&Turn> = turns.iter().filter(|t| !t.is_blank()).collect();
        if spoken.is_empty() {
            return AnalysisResult::neutral();
        }

        let sentiment_by_role = Self::sentiment_by_role(&spoken);
        let tactics_detected = Self::detect_tactics(&spoken);
        let success_probability =
            Self::estimate_success(&sentiment_by_role, &tactics_detected);
        let recommendations =
            Self::build_recommendations(&sentiment_by_role, &tactics_detected);

        AnalysisResult {
            sentiment_by_role,
            tactics_detected,
            success_probability,
            recommendations,
        }
    }

    /// Suggests skill-building exercises for the counterparty side, aimed at
    /// the given target outcome (e.g. "successful").
    ///
    /// Derived from the same signals as [`analyze`](Self::analyze); purely
    /// advisory and never persisted by the core.
    pub fn suggest_training(&self, turns: &[Turn], target_outcome: &str) -> Vec<String> {
        let analysis = self.analyze(turns);
        let mut suggestions = Vec::new();

        if !analysis.tactics_detected.contains(&Tactic::EmpathyAppeal) {
            suggestions.push(
                "Try using more empathetic language when addressing price concerns".to_string(),
            );
        }
        if !analysis.tactics_detected.contains(&Tactic::AlternativeOffer) {
            suggestions.push(
                "Consider presenting value propositions before discussing alternatives"
                    .to_string(),
            );
        }
        if analysis
            .sentiment_by_role
            .get(&Role::Customer)
            .copied()
            .unwrap_or(0.0)
            < 0.0
        {
            suggestions.push(
                "Use confirmation questions to ensure customer understanding".to_string(),
            );
        }
        if analysis.success_probability < 0.5 {
            suggestions.push(format!(
                "Review this exchange against a {} outcome and identify the turn where momentum was lost",
                target_outcome
            ));
        }

        suggestions
    }

    fn sentiment_by_role(spoken: &[&Turn]) -> HashMap<Role, f64> {
        let mut sums: HashMap<Role, (f64, usize)> = HashMap::new();
        for turn in spoken {
            let entry = sums.entry(turn.role()).or_insert((0.0, 0));
            entry.0 += score_sentiment(turn.text());
            entry.1 += 1;
        }

        sums.into_iter()
            .map(|(role, (sum, count))| (role, sum / count as f64))
            .collect()
    }

    fn detect_tactics(spoken: &[&Turn]) -> BTreeSet<Tactic> {
        spoken
            .iter()
            .flat_map(|t| Tactic::detect_all(t.text()))
            .collect()
    }

    /// Heuristic: start from even odds, shift by customer mood, then adjust
    /// for tactic signals that historically correlate with closed deals.
    fn estimate_success(
        sentiment: &HashMap<Role, f64>,
        tactics: &BTreeSet<Tactic>,
    ) -> f64 {
        let customer_mood = sentiment.get(&Role::Customer).copied().unwrap_or(0.0);

        let mut estimate = 0.5 + 0.3 * customer_mood;
        if tactics.contains(&Tactic::Concession) {
            estimate += 0.1;
        }
        if tactics.contains(&Tactic::EmpathyAppeal) {
            estimate += 0.05;
        }
        if tactics.contains(&Tactic::UrgencyPressure) {
            estimate -= 0.1;
        }

        estimate.clamp(0.0, 1.0)
    }

    fn build_recommendations(
        sentiment: &HashMap<Role, f64>,
        tactics: &BTreeSet<Tactic>,
    ) -> Vec<String> {
        let mut recommendations = Vec::new();

        if !tactics.contains(&Tactic::AlternativeOffer) {
            recommendations.push("Consider offering alternatives".to_string());
        }
        if sentiment.get(&Role::Customer).copied().unwrap_or(0.0) < 0.0 {
            recommendations.push("Acknowledge customer concerns more explicitly".to_string());
        }
        if tactics.contains(&Tactic::UrgencyPressure) {
            recommendations.push(
                "Avoid manufactured time pressure; it erodes trust late in a negotiation"
                    .to_string(),
            );
        }
        if !tactics.contains(&Tactic::Concession) {
            recommendations.push(
                "Signal flexibility with a small concession to keep the exchange moving"
                    .to_string(),
            );
        }

        recommendations
    }
}
