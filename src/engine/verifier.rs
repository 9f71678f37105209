//! Resolves pending predictions against completion messages.
//!
//! A prediction for target round `T` succeeds when a completion message for round
//! `T` or `T + 1` carries the predicted suit in its first parenthesized group. The
//! first completion message for round `T + 2` or later fails it. At most one record
//! is resolved per message, scanning pending targets in ascending order.

use tracing::{debug, info};

use crate::engine::classifier::has_success_marker;
use crate::engine::state::EngineState;
use crate::engine::symbols::{extract_round, first_group_contains};
use crate::model::outcome::{Resolution, ResolutionKind};
use crate::model::prediction::{render_failure, render_pending, render_success, PredictionStatus};

/// Offsets at which a prediction can still succeed.
pub const SUCCESS_OFFSETS: [i64; 2] = [0, 1];
/// First offset at which a prediction is conclusively failed.
pub const FAILURE_OFFSET: i64 = 2;

pub fn evaluate(state: &mut EngineState, text: &str) -> Option<Resolution> {
    let round = extract_round(text)?;

    if !has_success_marker(text) {
        debug!(round, "no success marker, nothing to verify");
        return None;
    }
    if state.store.is_empty() {
        debug!(round, "no predictions stored");
        return None;
    }

    for target in state.store.pending_targets() {
        let Some(record) = state.store.get(target) else {
            continue;
        };
        let suit = record.predicted_suit;
        // Both rounds are at most i64::MAX, see `symbols::MAX_ROUND`.
        let offset = round as i64 - target as i64;

        let (kind, new_text) = if SUCCESS_OFFSETS.contains(&offset) {
            if !first_group_contains(text, suit) {
                debug!(round, target, offset, suit = suit.name(), "suit not in first group");
                continue;
            }
            (
                ResolutionKind::Correct { offset },
                render_success(target, suit, offset),
            )
        } else if offset >= FAILURE_OFFSET {
            (ResolutionKind::Failed { offset }, render_failure(target, suit))
        } else {
            debug!(round, target, offset, "message precedes target round, still pending");
            continue;
        };

        let status = match kind {
            ResolutionKind::Correct { .. } => PredictionStatus::Correct,
            ResolutionKind::Failed { .. } => PredictionStatus::Failed,
        };
        let old_text = render_pending(target, suit);
        state.store.resolve(target, status, offset, new_text.clone());
        info!(round, target, offset, ?status, "prediction resolved");

        return Some(Resolution {
            target_round: target,
            kind,
            new_text,
            old_text,
        });
    }

    debug!(round, "no pending prediction resolved");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::cooldown::{CooldownGate, TimestampFile};
    use crate::engine::dedup::SeenTexts;
    use crate::engine::predictor::make_prediction;
    use crate::model::outcome::PredictionDecision;
    use crate::model::suit::Suit;

    fn state_with(predictions: &[(u64, Suit)]) -> EngineState {
        let mut s =
            EngineState::new(CooldownGate::new(30, TimestampFile::none()), SeenTexts::default());
        for (target, suit) in predictions {
            make_prediction(
                &mut s,
                PredictionDecision {
                    source_round: target - 1,
                    suit: *suit,
                },
            );
        }
        s
    }

    #[test]
    fn success_at_offset_zero() {
        let mut s = state_with(&[(745, Suit::Clubs)]);
        let r = evaluate(&mut s, "#n745 (♣️♦️♠️) ✅").unwrap();
        assert_eq!(r.target_round, 745);
        assert_eq!(r.kind, ResolutionKind::Correct { offset: 0 });
        assert_eq!(r.new_text, "🔵745🔵:♣️statut :✅0️⃣");
        assert_eq!(r.old_text, "🔵745🔵:♣️statut :⏳");
        let record = s.store.get(745).unwrap();
        assert_eq!(record.status, PredictionStatus::Correct);
        assert_eq!(record.verification_offset, Some(0));
    }

    #[test]
    fn success_at_offset_one_after_miss() {
        let mut s = state_with(&[(745, Suit::Clubs)]);
        assert_eq!(evaluate(&mut s, "#n745 (♦️♠️) (♣️) ✅"), None);
        assert!(s.store.is_pending(745));
        let r = evaluate(&mut s, "#n746 (♠️♣️) ✅").unwrap();
        assert_eq!(r.new_text, "🔵745🔵:♣️statut :✅1️⃣");
    }

    #[test]
    fn failure_at_offset_two_regardless_of_content() {
        let mut s = state_with(&[(745, Suit::Clubs)]);
        let r = evaluate(&mut s, "#n747 (♣️♣️♣️) ✅").unwrap();
        assert_eq!(r.kind, ResolutionKind::Failed { offset: 2 });
        assert_eq!(r.new_text, "🔵745🔵:♣️statut :⭕");
        assert_eq!(s.store.get(745).unwrap().status, PredictionStatus::Failed);
    }

    #[test]
    fn resolved_record_is_never_reevaluated() {
        let mut s = state_with(&[(745, Suit::Clubs)]);
        evaluate(&mut s, "#n745 (♣️) ✅").unwrap();
        assert_eq!(evaluate(&mut s, "#n749 (♠️) ✅"), None);
        assert_eq!(s.store.get(745).unwrap().status, PredictionStatus::Correct);
    }

    #[test]
    fn requires_success_marker() {
        let mut s = state_with(&[(745, Suit::Clubs)]);
        assert_eq!(evaluate(&mut s, "#n745 (♣️) 🔰"), None);
        assert_eq!(evaluate(&mut s, "#n745 (♣️)"), None);
        assert!(s.store.is_pending(745));
    }

    #[test]
    fn no_round_or_no_predictions() {
        let mut s = state_with(&[(745, Suit::Clubs)]);
        assert_eq!(evaluate(&mut s, "(♣️) ✅"), None);
        let mut empty = state_with(&[]);
        assert_eq!(evaluate(&mut empty, "#n745 (♣️) ✅"), None);
    }

    #[test]
    fn earlier_round_leaves_prediction_pending() {
        let mut s = state_with(&[(745, Suit::Clubs)]);
        assert_eq!(evaluate(&mut s, "#n744 (♣️) ✅"), None);
        assert!(s.store.is_pending(745));
    }

    #[test]
    fn huge_round_numbers_leave_predictions_pending() {
        let mut s = state_with(&[(745, Suit::Clubs)]);
        assert_eq!(evaluate(&mut s, "#n9223372036854775808 (♣️) ✅"), None);
        assert_eq!(evaluate(&mut s, "#n18446744073709551615 (♣️) ✅"), None);
        assert!(s.store.is_pending(745));

        let r = evaluate(&mut s, "#n9223372036854775806 (♣️) ✅").unwrap();
        assert_eq!(r.kind, ResolutionKind::Failed { offset: i64::MAX - 1 - 745 });
    }

    #[test]
    fn one_resolution_per_message_in_ascending_order() {
        let mut s = state_with(&[(700, Suit::Hearts), (710, Suit::Spades)]);
        let first = evaluate(&mut s, "#n720 (♠️) ✅").unwrap();
        assert_eq!(first.target_round, 700);
        assert!(s.store.is_pending(710));
        let second = evaluate(&mut s, "#n720 (♠️) ✅").unwrap();
        assert_eq!(second.target_round, 710);
        assert_eq!(second.kind, ResolutionKind::Failed { offset: 10 });
    }

    #[test]
    fn miss_on_earlier_target_falls_through_to_later() {
        let mut s = state_with(&[(800, Suit::Hearts), (801, Suit::Spades)]);
        let r = evaluate(&mut s, "#n801 (♠️♦️) ✅").unwrap();
        assert_eq!(r.target_round, 801);
        assert_eq!(r.kind, ResolutionKind::Correct { offset: 0 });
        assert!(s.store.is_pending(800));
    }
}
