//! Negotiation tactic detection.
//!
//! Tactics are labeled behavior patterns spotted in transcript text by phrase
//! matching. Detection errs on the side of precision: a tactic is only
//! reported when one of its marker phrases appears verbatim (case
//! insensitive), because false labels poison the curated dataset.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A labeled negotiation behavior pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tactic {
    /// Opening with an extreme number to shift the reference point.
    Anchoring,
    /// Giving ground on price or terms.
    Concession,
    /// Manufactured time pressure ("today only").
    UrgencyPressure,
    /// Offering a substitute instead of the requested terms.
    AlternativeOffer,
    /// Deferring to policy or a higher authority.
    AuthorityAppeal,
    /// Appealing to the relationship or the other party's situation.
    EmpathyAppeal,
}

impl Tactic {
    /// All known tactics, in label order.
    pub const ALL: [Tactic; 6] = [
        Tactic::Anchoring,
        Tactic::Concession,
        Tactic::UrgencyPressure,
        Tactic::AlternativeOffer,
        Tactic::AuthorityAppeal,
        Tactic::EmpathyAppeal,
    ];

    /// Returns the dataset label for this tactic.
    pub fn label(&self) -> &'static str {
        match self {
            Tactic::Anchoring => "anchoring",
            Tactic::Concession => "concession",
            Tactic::UrgencyPressure => "urgency_pressure",
            Tactic::AlternativeOffer => "alternative_offer",
            Tactic::AuthorityAppeal => "authority_appeal",
            Tactic::EmpathyAppeal => "empathy_appeal",
        }
    }

    /// Returns true if any of this tactic's marker phrases appears in the
    /// text (case insensitive).
    pub fn matches(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        markers_for(*self).iter().any(|m| lowered.contains(m))
    }

    /// Returns every tactic whose markers appear in the text.
    pub fn detect_all(text: &str) -> Vec<Tactic> {
        let lowered = text.to_lowercase();
        Tactic::ALL
            .into_iter()
            .filter(|t| markers_for(*t).iter().any(|m| lowered.contains(m)))
            .collect()
    }
}

impl std::fmt::Display for Tactic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

static ANCHORING_MARKERS: &[&str] = &[
    "my budget is",
    "the most i can pay",
    "i was thinking more like",
    "the going rate is",
    "elsewhere i can get",
    "best price i've seen",
];

static CONCESSION_MARKERS: &[&str] = &[
    "i can offer",
    "i could do",
    "meet you halfway",
    "knock off",
    "we can lower",
    "i'll throw in",
    "how about we",
];

static URGENCY_MARKERS: &[&str] = &[
    "today only",
    "offer expires",
    "right now",
    "before the end of",
    "last chance",
    "while stocks last",
];

static ALTERNATIVE_MARKERS: &[&str] = &[
    "instead",
    "another option",
    "an alternative",
    "different model",
    "similar product",
    "store credit",
];

static AUTHORITY_MARKERS: &[&str] = &[
    "company policy",
    "my manager",
    "not authorized",
    "head office",
    "above my",
    "our policy",
];

static EMPATHY_MARKERS: &[&str] = &[
    "i understand",
    "i appreciate",
    "i hear you",
    "loyal customer",
    "i know how",
    "been with us",
];

static ALL_MARKERS: Lazy<[(Tactic, &'static [&'static str]); 6]> = Lazy::new(|| {
    [
        (Tactic::Anchoring, ANCHORING_MARKERS),
        (Tactic::Concession, CONCESSION_MARKERS),
        (Tactic::UrgencyPressure, URGENCY_MARKERS),
        (Tactic::AlternativeOffer, ALTERNATIVE_MARKERS),
        (Tactic::AuthorityAppeal, AUTHORITY_MARKERS),
        (Tactic::EmpathyAppeal, EMPATHY_MARKERS),
    ]
});

fn markers_for(tactic: Tactic) -> &'static [&'static str] {
    ALL_MARKERS
        .iter()
        .find(|(t, _)| *t == tactic)
        .map(|(_, markers)| *markers)
        .expect("every tactic has a marker table")
}
