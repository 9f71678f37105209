use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::engine::cooldown::CooldownGate;
use crate::engine::dedup::SeenTexts;
use crate::model::prediction::PredictionStore;

/// Deferred temporaries further behind the newest round than this are dropped.
pub const DEFERRED_ROUND_HORIZON: u64 = 100;

/// A temporary message waiting for its final edit.
#[derive(Debug, Clone, PartialEq)]
pub struct DeferredMessage {
    pub message_id: Option<i64>,
    pub text: String,
    pub observed_at: f64,
}

/// All mutable state shared by the prediction and verification passes.
#[derive(Debug)]
pub struct EngineState {
    pub store: PredictionStore,
    pub gate: CooldownGate,
    pub seen: SeenTexts,
    deferred: BTreeMap<u64, DeferredMessage>,
}

impl EngineState {
    pub fn new(gate: CooldownGate, seen: SeenTexts) -> Self {
        Self {
            store: PredictionStore::new(),
            gate,
            seen,
            deferred: BTreeMap::new(),
        }
    }

    pub fn defer(&mut self, round: u64, message: DeferredMessage) {
        self.deferred.insert(round, message);
        let newest = self.deferred.keys().next_back().copied().unwrap_or(round);
        let floor = newest.saturating_sub(DEFERRED_ROUND_HORIZON);
        let kept = self.deferred.split_off(&floor);
        let dropped = self.deferred.len();
        self.deferred = kept;
        if dropped > 0 {
            debug!(dropped, floor, "pruned stale deferred messages");
        }
    }

    pub fn is_deferred(&self, round: u64) -> bool {
        self.deferred.contains_key(&round)
    }

    pub fn deferred(&self, round: u64) -> Option<&DeferredMessage> {
        self.deferred.get(&round)
    }

    pub fn clear_deferred(&mut self, round: u64) -> Option<DeferredMessage> {
        self.deferred.remove(&round)
    }

    pub fn deferred_count(&self) -> usize {
        self.deferred.len()
    }

    /// Full reset: predictions, admissions, deferred messages and the cooldown.
    pub fn reset(&mut self) {
        self.store.clear();
        self.seen.clear();
        self.deferred.clear();
        self.gate.reset();
        info!("prediction state reset");
    }
}
