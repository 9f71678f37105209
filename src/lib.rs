//! Mirror-rule suit predictions for a card-game results channel.
//!
//! Messages from the source channel are classified, offered to the prediction
//! pass and then to the verification pass. Predictions are published to a target
//! channel and edited in place once verified.

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;

pub use error::{Error, Result};
pub use logging::{init_logging, LogFormat};
