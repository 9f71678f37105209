use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::model::suit::{normalize_hearts, Suit};

fn round_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#[nN](\d+)").expect("static round pattern"))
}

fn group_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(([^)]+)\)").expect("static group pattern"))
}

/// Largest accepted round number. Its target round and every offset still fit in `i64`.
pub const MAX_ROUND: u64 = i64::MAX as u64 - 1;

/// Round number from the first `#n<digits>` / `#N<digits>` token.
pub fn extract_round(text: &str) -> Option<u64> {
    round_pattern()
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .filter(|round| *round <= MAX_ROUND)
}

/// Contents of every non-empty parenthesized group, hearts normalized.
pub fn parenthesized_groups(text: &str) -> Vec<String> {
    let normalized = normalize_hearts(text);
    group_pattern()
        .captures_iter(&normalized)
        .filter_map(|c| c.get(1).map(|m| m.as_str().to_string()))
        .collect()
}

/// Distinct suits per parenthesized group.
pub fn suits_per_group(text: &str) -> Vec<BTreeSet<Suit>> {
    parenthesized_groups(text)
        .iter()
        .map(|group| {
            Suit::ALL
                .into_iter()
                .filter(|s| group.contains(s.glyph()))
                .collect()
        })
        .collect()
}

/// Whether `suit` appears inside the first parenthesized group only.
pub fn first_group_contains(text: &str, suit: Suit) -> bool {
    suits_per_group(text)
        .first()
        .is_some_and(|group| group.contains(&suit))
}

/// Occurrences of each suit across the whole text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuitCounts {
    counts: [usize; 4],
}

impl SuitCounts {
    pub fn of(text: &str) -> Self {
        let normalized = normalize_hearts(text);
        let mut counts = [0; 4];
        for (i, suit) in Suit::ALL.into_iter().enumerate() {
            counts[i] = normalized.matches(suit.glyph()).count();
        }
        Self { counts }
    }

    pub fn get(&self, suit: Suit) -> usize {
        self.counts[suit as usize]
    }

    /// First suit in enumeration order whose count reaches `threshold`.
    pub fn first_at_least(&self, threshold: usize) -> Option<Suit> {
        Suit::ALL.into_iter().find(|s| self.get(*s) >= threshold)
    }
}
