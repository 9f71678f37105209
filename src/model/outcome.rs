use serde::{Deserialize, Serialize};

use crate::model::suit::Suit;

/// Positive decision of the prediction engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionDecision {
    pub source_round: u64,
    pub suit: Suit,
}

impl PredictionDecision {
    pub fn target_round(&self) -> u64 {
        self.source_round.saturating_add(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolutionKind {
    Correct { offset: i64 },
    Failed { offset: i64 },
}

/// Outcome of verifying one pending prediction against a completion message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub target_round: u64,
    pub kind: ResolutionKind,
    pub new_text: String,
    pub old_text: String,
}
