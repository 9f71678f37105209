//! Decides whether a message triggers a prediction for the next round.

use tracing::{debug, info};

use crate::engine::classifier::{classify, skip_marker, MessageKind};
use crate::engine::state::{DeferredMessage, EngineState};
use crate::engine::symbols::{extract_round, SuitCounts};
use crate::model::outcome::PredictionDecision;
use crate::model::prediction::{render_pending, PredictionRecord, PredictionStatus};
use crate::model::suit::Suit;

/// Occurrences of one suit needed for the mirror rule to fire.
pub const MIRROR_THRESHOLD: usize = 3;

/// Mirror of the first suit (hearts, spades, diamonds, clubs) counted at least
/// [`MIRROR_THRESHOLD`] times anywhere in `text`.
pub fn mirror_rule(text: &str) -> Option<Suit> {
    let counts = SuitCounts::of(text);
    let over = counts.first_at_least(MIRROR_THRESHOLD)?;
    debug!(suit = over.name(), count = counts.get(over), mirror = over.mirror().name(), "mirror rule fired");
    Some(over.mirror())
}

/// Run the prediction pass over one message.
///
/// On a positive decision the text is marked as seen and the cooldown is stamped at
/// `now`; the caller must then call [`make_prediction`] before evaluating the next
/// message.
pub fn evaluate(
    state: &mut EngineState,
    text: &str,
    message_id: Option<i64>,
    now: f64,
) -> Option<PredictionDecision> {
    let round = extract_round(text)?;

    if let Some(marker) = skip_marker(text) {
        debug!(round, marker, "skip marker present, no prediction");
        return None;
    }

    let kind = classify(text);
    if kind == MessageKind::Temporary {
        debug!(round, "temporary message, waiting for final edit");
        state.defer(
            round,
            DeferredMessage {
                message_id,
                text: text.to_string(),
                observed_at: now,
            },
        );
        return None;
    }

    let target = round.checked_add(1)?;
    if state.store.is_pending(target) {
        debug!(round, target, "prediction already pending for target");
        return None;
    }

    if kind == MessageKind::Final {
        if let Some(deferred) = state.clear_deferred(round) {
            debug!(
                round,
                message_id = ?deferred.message_id,
                waited = now - deferred.observed_at,
                changed = deferred.text != text,
                "final edit received, deferred message cleared"
            );
        }
    }

    if !state.gate.allow(now) {
        debug!(round, remaining = state.gate.remaining(now), "cooldown active");
        return None;
    }

    let suit = mirror_rule(text)?;

    if !state.seen.admit(text) {
        debug!(round, "message already processed");
        return None;
    }
    state.gate.record(now);

    info!(round, target, suit = suit.name(), "prediction decided");
    Some(PredictionDecision {
        source_round: round,
        suit,
    })
}

/// Store a pending record for the decision's target round and return its text.
pub fn make_prediction(state: &mut EngineState, decision: PredictionDecision) -> String {
    let target = decision.target_round();
    let text = render_pending(target, decision.suit);
    state.store.insert_pending(
        target,
        PredictionRecord {
            predicted_suit: decision.suit,
            status: PredictionStatus::Pending,
            predicted_from: decision.source_round,
            verification_offset: None,
            rendered_text: text.clone(),
            sent: None,
        },
    );
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cooldown::{CooldownGate, TimestampFile};
    use crate::engine::dedup::SeenTexts;

    fn state() -> EngineState {
        EngineState::new(CooldownGate::new(30, TimestampFile::none()), SeenTexts::default())
    }

    #[test]
    fn no_round_no_decision() {
        let mut s = state();
        assert_eq!(evaluate(&mut s, "(♥️♥️♥️) ✅", None, 100.0), None);
        assert_eq!(s.gate.last_prediction_time(), 0.0);
    }

    #[test]
    fn three_hearts_predict_clubs() {
        let mut s = state();
        let text = "#n744 (♠️♥️♦️) (♥️♥️♥️) ✅";
        let decision = evaluate(&mut s, text, None, 100.0).unwrap();
        assert_eq!(decision.source_round, 744);
        assert_eq!(decision.suit, Suit::Clubs);
        assert_eq!(make_prediction(&mut s, decision), "🔵745🔵:♣️statut :⏳");
        assert!(s.store.is_pending(745));
        assert_eq!(s.gate.last_prediction_time(), 100.0);
    }

    #[test]
    fn heart_variant_counts_as_hearts() {
        assert_eq!(mirror_rule("#n1 (❤️❤️) (♥️)"), Some(Suit::Clubs));
    }

    #[test]
    fn skip_markers_block_prediction() {
        for text in [
            "#n10 #R (♠️♠️♠️) ✅",
            "#n10 #X (♠️♠️♠️) ✅",
            "#n10 (♠️♠️♠️) 🔰",
        ] {
            let mut s = state();
            assert_eq!(evaluate(&mut s, text, None, 100.0), None, "{}", text);
        }
    }

    #[test]
    fn below_threshold_no_decision() {
        let mut s = state();
        assert_eq!(evaluate(&mut s, "#n10 (♠️♠️♥️) (♦️♣️) ✅", None, 100.0), None);
        assert_eq!(s.gate.last_prediction_time(), 0.0);
    }

    #[test]
    fn temporary_message_is_deferred_then_finalized() {
        let mut s = state();
        assert_eq!(evaluate(&mut s, "#n20 (♠️♠️♠️) ⏰", Some(5), 100.0), None);
        assert!(s.is_deferred(20));
        assert_eq!(s.deferred(20).unwrap().message_id, Some(5));

        let decision = evaluate(&mut s, "#n20 (♠️♠️♠️) ✅", Some(5), 101.0).unwrap();
        assert_eq!(decision.suit, Suit::Diamonds);
        assert!(!s.is_deferred(20));
    }

    #[test]
    fn ordinary_message_can_predict() {
        let mut s = state();
        let decision = evaluate(&mut s, "#n30 (♣️♣️♣️)", None, 100.0).unwrap();
        assert_eq!(decision.suit, Suit::Hearts);
    }

    #[test]
    fn cooldown_blocks_second_prediction() {
        let mut s = state();
        let d = evaluate(&mut s, "#n40 (♣️♣️♣️) ✅", None, 100.0).unwrap();
        make_prediction(&mut s, d);
        assert_eq!(evaluate(&mut s, "#n41 (♠️♠️♠️) ✅", None, 110.0), None);
        assert!(evaluate(&mut s, "#n42 (♠️♠️♠️) ✅", None, 130.0).is_some());
    }

    #[test]
    fn same_text_twice_predicts_once() {
        let mut s = state();
        let text = "#n50 (♦️♦️♦️) ✅";
        let d = evaluate(&mut s, text, None, 100.0).unwrap();
        make_prediction(&mut s, d);
        s.store.resolve(51, PredictionStatus::Failed, 2, String::new());
        assert_eq!(evaluate(&mut s, text, None, 1000.0), None);
    }

    #[test]
    fn pending_target_suppresses_duplicate() {
        let mut s = state();
        let d = evaluate(&mut s, "#n60 (♦️♦️♦️) ✅", None, 100.0).unwrap();
        make_prediction(&mut s, d);
        assert_eq!(evaluate(&mut s, "#n60 (♣️♣️♣️) ✅ edit", None, 1000.0), None);
    }

    #[test]
    fn huge_round_numbers_are_ignored() {
        let mut s = state();
        assert_eq!(evaluate(&mut s, "#n18446744073709551615 (♥️♥️♥️) ✅", None, 100.0), None);
        assert_eq!(evaluate(&mut s, "#n9223372036854775807 (♥️♥️♥️) ✅", None, 100.0), None);
        assert_eq!(s.gate.last_prediction_time(), 0.0);

        let d = evaluate(&mut s, "#n9223372036854775806 (♥️♥️♥️) ✅", None, 100.0).unwrap();
        assert_eq!(d.target_round(), i64::MAX as u64);
    }

    #[test]
    fn rejected_by_cooldown_does_not_consume_text() {
        let mut s = state();
        s.gate.record(100.0);
        let text = "#n70 (♦️♦️♦️) ✅";
        assert_eq!(evaluate(&mut s, text, None, 110.0), None);
        assert!(evaluate(&mut s, text, None, 130.0).is_some());
    }
}
