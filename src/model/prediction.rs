use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::suit::Suit;

/// Marker rendered while a prediction waits for verification.
pub const PENDING_MARKER: &str = "⏳";
/// Marker rendered once a prediction is conclusively failed.
pub const FAILED_MARKER: &str = "⭕";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionStatus {
    Pending,
    Correct,
    Failed,
}

/// Where a published prediction lives, so it can be edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentMessage {
    pub chat_id: i64,
    pub message_id: i64,
}

/// A prediction for one target round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub predicted_suit: Suit,
    pub status: PredictionStatus,
    /// Round whose message triggered this prediction.
    pub predicted_from: u64,
    /// Only meaningful once `status != Pending`.
    pub verification_offset: Option<i64>,
    pub rendered_text: String,
    pub sent: Option<SentMessage>,
}

impl PredictionRecord {
    pub fn is_pending(&self) -> bool {
        self.status == PredictionStatus::Pending
    }
}

/// `🔵{target}🔵:{suit}statut :⏳`
pub fn render_pending(target: u64, suit: Suit) -> String {
    format!("🔵{}🔵:{}statut :{}", target, suit, PENDING_MARKER)
}

/// `🔵{target}🔵:{suit}statut :✅{offset}️⃣`
pub fn render_success(target: u64, suit: Suit, offset: i64) -> String {
    format!("🔵{}🔵:{}statut :✅{}\u{FE0F}\u{20E3}", target, suit, offset)
}

/// `🔵{target}🔵:{suit}statut :⭕`
pub fn render_failure(target: u64, suit: Suit) -> String {
    format!("🔵{}🔵:{}statut :{}", target, suit, FAILED_MARKER)
}

/// Predictions keyed by target round, iterated in ascending round order.
#[derive(Debug, Default)]
pub struct PredictionStore {
    records: BTreeMap<u64, PredictionRecord>,
}

impl PredictionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, target: u64) -> Option<&PredictionRecord> {
        self.records.get(&target)
    }

    pub fn is_pending(&self, target: u64) -> bool {
        self.records.get(&target).is_some_and(PredictionRecord::is_pending)
    }

    /// Insert a fresh pending record. Returns false and leaves the store untouched
    /// when a pending record already exists for `target`.
    pub fn insert_pending(&mut self, target: u64, record: PredictionRecord) -> bool {
        if self.is_pending(target) {
            return false;
        }
        self.records.insert(target, record);
        true
    }

    /// Target rounds of pending records, ascending.
    pub fn pending_targets(&self) -> Vec<u64> {
        self.records
            .iter()
            .filter(|(_, r)| r.is_pending())
            .map(|(t, _)| *t)
            .collect()
    }

    pub fn pending_count(&self) -> usize {
        self.records.values().filter(|r| r.is_pending()).count()
    }

    /// Move a pending record to `status`. No-op for records already resolved.
    pub fn resolve(
        &mut self,
        target: u64,
        status: PredictionStatus,
        offset: i64,
        rendered_text: String,
    ) -> bool {
        match self.records.get_mut(&target) {
            Some(record) if record.is_pending() && status != PredictionStatus::Pending => {
                record.status = status;
                record.verification_offset = Some(offset);
                record.rendered_text = rendered_text;
                true
            }
            _ => false,
        }
    }

    pub fn attach_message(&mut self, target: u64, sent: SentMessage) {
        if let Some(record) = self.records.get_mut(&target) {
            record.sent = Some(sent);
        }
    }

    /// Percentage of correct predictions among the last `window` resolved ones.
    pub fn success_rate(&self, window: usize) -> Option<f64> {
        let resolved: Vec<&PredictionRecord> = self
            .records
            .values()
            .rev()
            .filter(|r| !r.is_pending())
            .take(window)
            .collect();
        if resolved.is_empty() {
            return None;
        }
        let correct = resolved
            .iter()
            .filter(|r| r.status == PredictionStatus::Correct)
            .count();
        Some(correct as f64 * 100.0 / resolved.len() as f64)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(from: u64, suit: Suit) -> PredictionRecord {
        PredictionRecord {
            predicted_suit: suit,
            status: PredictionStatus::Pending,
            predicted_from: from,
            verification_offset: None,
            rendered_text: render_pending(from + 1, suit),
            sent: None,
        }
    }

    #[test]
    fn render_formats() {
        assert_eq!(render_pending(745, Suit::Clubs), "🔵745🔵:♣️statut :⏳");
        assert_eq!(render_success(745, Suit::Clubs, 0), "🔵745🔵:♣️statut :✅0️⃣");
        assert_eq!(render_success(745, Suit::Clubs, 1), "🔵745🔵:♣️statut :✅1️⃣");
        assert_eq!(render_failure(745, Suit::Clubs), "🔵745🔵:♣️statut :⭕");
    }

    #[test]
    fn duplicate_pending_insert_is_rejected() {
        let mut store = PredictionStore::new();
        assert!(store.insert_pending(10, pending(9, Suit::Hearts)));
        assert!(!store.insert_pending(10, pending(9, Suit::Clubs)));
        assert_eq!(store.get(10).unwrap().predicted_suit, Suit::Hearts);
    }

    #[test]
    fn resolve_happens_once() {
        let mut store = PredictionStore::new();
        store.insert_pending(10, pending(9, Suit::Hearts));
        assert!(store.resolve(10, PredictionStatus::Failed, 2, "x".into()));
        assert!(!store.resolve(10, PredictionStatus::Correct, 0, "y".into()));
        let record = store.get(10).unwrap();
        assert_eq!(record.status, PredictionStatus::Failed);
        assert_eq!(record.verification_offset, Some(2));
        assert!(store.pending_targets().is_empty());
    }

    #[test]
    fn pending_targets_are_ascending() {
        let mut store = PredictionStore::new();
        store.insert_pending(30, pending(29, Suit::Hearts));
        store.insert_pending(12, pending(11, Suit::Spades));
        store.insert_pending(20, pending(19, Suit::Clubs));
        assert_eq!(store.pending_targets(), vec![12, 20, 30]);
    }

    #[test]
    fn success_rate_over_resolved_only() {
        let mut store = PredictionStore::new();
        assert_eq!(store.success_rate(20), None);
        for t in 1..=4 {
            store.insert_pending(t, pending(t - 1, Suit::Hearts));
        }
        store.resolve(1, PredictionStatus::Correct, 0, String::new());
        store.resolve(2, PredictionStatus::Failed, 2, String::new());
        store.resolve(3, PredictionStatus::Correct, 1, String::new());
        assert_eq!(store.success_rate(20), Some(200.0 / 3.0));
        assert_eq!(store.success_rate(1), Some(100.0));
    }
}
