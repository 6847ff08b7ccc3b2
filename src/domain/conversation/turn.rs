//! Turn entity for negotiation conversations.
//!
//! Turns are immutable records of customer/counterparty utterances within a
//! session. Each turn carries its position in the transcript; sequence indices
//! are strictly increasing within a session and never reassigned.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Unique identifier for a turn within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TurnId(Uuid);

impl TurnId {
    /// Creates a new random TurnId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a TurnId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TurnId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TurnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TurnId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Who spoke a turn in the negotiation.
///
/// Provider adapters own the mapping onto each vendor's own role vocabulary
/// (e.g. user/assistant); the domain only knows these two parties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The trainee playing the customer side.
    Customer,
    /// The simulated business counterparty (the model).
    Counterparty,
}

impl Role {
    /// Returns the opposite party.
    pub fn other(&self) -> Role {
        match self {
            Role::Customer => Role::Counterparty,
            Role::Counterparty => Role::Customer,
        }
    }

    /// Returns the display label for this role.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Counterparty => "counterparty",
        }
    }
}

/// An immutable utterance within a negotiation session.
///
/// # Invariants
///
/// - `text` is non-empty (validated at construction)
/// - `sequence_index` is strictly increasing within a session
/// - no field changes after construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Unique identifier for this turn.
    id: TurnId,

    /// Who spoke.
    role: Role,

    /// The utterance text.
    text: String,

    /// Free-form labels attached by the dataset curator.
    tags: BTreeSet<String>,

    /// Position within the session transcript.
    sequence_index: u32,

    /// When the turn was created.
    created_at: Timestamp,
}

impl Turn {
    /// Creates a new turn at the given transcript position.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if text is empty or whitespace only
    pub fn new(
        role: Role,
        text: impl Into<String>,
        sequence_index: u32,
    ) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::empty_field("text"));
        }

        Ok(Self {
            id: TurnId::new(),
            role,
            text,
            tags: BTreeSet::new(),
            sequence_index,
            created_at: Timestamp::now(),
        })
    }

    /// Creates a customer turn.
    pub fn customer(text: impl Into<String>, sequence_index: u32) -> Result<Self, ValidationError> {
        Self::new(Role::Customer, text, sequence_index)
    }

    /// Creates a counterparty turn.
    pub fn counterparty(
        text: impl Into<String>,
        sequence_index: u32,
    ) -> Result<Self, ValidationError> {
        Self::new(Role::Counterparty, text, sequence_index)
    }

    /// Reconstitutes a turn from the session store (no validation).
    pub fn reconstitute(
        id: TurnId,
        role: Role,
        text: String,
        tags: BTreeSet<String>,
        sequence_index: u32,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            role,
            text,
            tags,
            sequence_index,
            created_at,
        }
    }

    /// Attaches curator tags; consumes and returns the turn.
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = String>) -> Self {
        self.tags.extend(tags);
        self
    }

    /// Returns the turn ID.
    pub fn id(&self) -> &TurnId {
        &self.id
    }

    /// Returns the role.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the utterance text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the curator tags.
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Returns the position in the transcript.
    pub fn sequence_index(&self) -> u32 {
        self.sequence_index
    }

    /// Returns when the turn was created.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns true if the text carries no visible content.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Returns the sequence index the next turn in a transcript should get.
///
/// Continues from the last turn rather than counting entries, so sparse
/// histories (e.g. a truncated export) still produce a strictly increasing
/// index.
pub(crate) fn next_sequence_index(turns: &[Turn]) -> u32 {
    turns.last().map(|t| t.sequence_index + 1).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod turn_id {
        use super::*;

        #[test]
        fn generates_unique_values() {
            assert_ne!(TurnId::new(), TurnId::new());
        }

        #[test]
        fn parses_from_valid_string() {
            let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
            let id: TurnId = uuid_str.parse().unwrap();
            assert_eq!(id.to_string(), uuid_str);
        }
    }

    mod role {
        use super::*;

        #[test]
        fn other_flips_party() {
            assert_eq!(Role::Customer.other(), Role::Counterparty);
            assert_eq!(Role::Counterparty.other(), Role::Customer);
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&Role::Counterparty).unwrap();
            assert_eq!(json, "\"counterparty\"");
        }
    }

    mod construction {
        use super::*;

        #[test]
        fn new_creates_turn_with_position() {
            let turn = Turn::new(Role::Customer, "Can you do better on price?", 3).unwrap();
            assert_eq!(turn.role(), Role::Customer);
            assert_eq!(turn.text(), "Can you do better on price?");
            assert_eq!(turn.sequence_index(), 3);
            assert!(turn.tags().is_empty());
        }

        #[test]
        fn rejects_empty_text() {
            assert!(Turn::new(Role::Customer, "", 0).is_err());
        }

        #[test]
        fn rejects_whitespace_only_text() {
            assert!(Turn::new(Role::Counterparty, "  \n\t ", 0).is_err());
        }

        #[test]
        fn with_tags_accumulates() {
            let turn = Turn::customer("I'd like a discount", 0)
                .unwrap()
                .with_tags(["discount_request".to_string()])
                .with_tags(["opening".to_string()]);
            assert_eq!(turn.tags().len(), 2);
            assert!(turn.tags().contains("discount_request"));
        }
    }

    mod sequencing {
        use super::*;

        #[test]
        fn next_index_is_zero_for_empty_transcript() {
            assert_eq!(next_sequence_index(&[]), 0);
        }

        #[test]
        fn next_index_continues_from_last_turn() {
            let turns = vec![
                Turn::customer("Hi", 0).unwrap(),
                Turn::counterparty("Hello, how can I help?", 1).unwrap(),
            ];
            assert_eq!(next_sequence_index(&turns), 2);
        }

        #[test]
        fn next_index_respects_sparse_histories() {
            let turns = vec![Turn::customer("Hi", 7).unwrap()];
            assert_eq!(next_sequence_index(&turns), 8);
        }
    }
}
