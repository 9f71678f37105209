pub mod inbound;
pub mod outcome;
pub mod prediction;
pub mod suit;
