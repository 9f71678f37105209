use crate::model::inbound::InboundEvent;
use crate::model::outcome::Resolution;
use crate::model::suit::Suit;

#[derive(Debug)]
pub enum EngineCommand {
    Inbound(InboundEvent),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EngineResponse {
    PredictionPublished {
        target_round: u64,
        suit: Suit,
        chat_id: i64,
        /// `None` when the transport failed to send.
        message_id: Option<i64>,
        text: String,
    },

    PredictionResolved {
        resolution: Resolution,
        /// Whether the original message was edited in place.
        edited: bool,
    },

    CommandReplied {
        chat_id: i64,
        text: String,
    },
}
