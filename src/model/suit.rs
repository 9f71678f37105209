use std::fmt;

use serde::{Deserialize, Serialize};

/// Alternate heart glyph; always normalized to [`Suit::Hearts`]'s glyph.
pub const HEART_VARIANT: &str = "❤️";

/// One of the four card suits, in the fixed enumeration order used for tie-breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suit {
    Hearts,
    Spades,
    Diamonds,
    Clubs,
}

impl Suit {
    /// Enumeration order: hearts, spades, diamonds, clubs.
    pub const ALL: [Suit; 4] = [Suit::Hearts, Suit::Spades, Suit::Diamonds, Suit::Clubs];

    /// Canonical glyph, including the emoji variation selector.
    pub fn glyph(self) -> &'static str {
        match self {
            Suit::Hearts => "♥️",
            Suit::Spades => "♠️",
            Suit::Diamonds => "♦️",
            Suit::Clubs => "♣️",
        }
    }

    /// The paired suit: hearts ↔ clubs, spades ↔ diamonds.
    pub fn mirror(self) -> Suit {
        match self {
            Suit::Hearts => Suit::Clubs,
            Suit::Clubs => Suit::Hearts,
            Suit::Spades => Suit::Diamonds,
            Suit::Diamonds => Suit::Spades,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Suit::Hearts => "hearts",
            Suit::Spades => "spades",
            Suit::Diamonds => "diamonds",
            Suit::Clubs => "clubs",
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Replace every alternate heart glyph with the canonical one.
pub fn normalize_hearts(text: &str) -> String {
    text.replace(HEART_VARIANT, Suit::Hearts.glyph())
}
