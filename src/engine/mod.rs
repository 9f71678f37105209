pub mod classifier;
pub mod commands;
pub mod cooldown;
pub mod dedup;
#[allow(clippy::module_inception)]
pub mod engine;
pub mod poller;
pub mod predictor;
pub mod protocol;
pub mod state;
pub mod symbols;
pub mod telegram_client;
pub mod verifier;
