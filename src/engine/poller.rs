use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::engine::protocol::EngineCommand;
use crate::engine::telegram_client::TelegramClient;
use crate::model::inbound::Update;

const BASE_BACKOFF_MS: u64 = 1_000;
const MAX_BACKOFF_MS: u64 = 60_000;

/// Delay before retry `attempt` (1-based): doubling, capped, plus up to 25% jitter.
pub fn backoff_delay(attempt: u32, rng: &mut impl Rng) -> Duration {
    let exp = BASE_BACKOFF_MS.saturating_mul(1u64 << attempt.saturating_sub(1).min(16));
    let base = exp.min(MAX_BACKOFF_MS);
    let jitter = rng.gen_range(0..=base / 4);
    Duration::from_millis(base + jitter)
}

/// Next `getUpdates` offset after a batch.
pub fn next_offset(current: i64, updates: &[Update]) -> i64 {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .map_or(current, |next| next.max(current))
}

/// Feeds updates to the engine until the engine hangs up.
pub fn run(client: &TelegramClient, engine: &Sender<EngineCommand>, timeout_secs: u64) -> Result<()> {
    client
        .delete_webhook()
        .context("removing webhook before long polling")?;
    info!(timeout_secs, "long polling started");

    let mut rng = rand::thread_rng();
    let mut offset = 0;
    let mut failures = 0u32;

    loop {
        let updates = match client.get_updates(offset, timeout_secs) {
            Ok(updates) => {
                failures = 0;
                updates
            }
            Err(e) => {
                failures += 1;
                let delay = backoff_delay(failures, &mut rng);
                if e.is_transient() {
                    warn!(error = %e, failures, ?delay, "getUpdates failed, retrying");
                } else {
                    error!(error = %e, failures, ?delay, "getUpdates rejected, retrying");
                }
                thread::sleep(delay);
                continue;
            }
        };

        offset = next_offset(offset, &updates);
        debug!(count = updates.len(), offset, "updates received");

        for update in updates {
            let Some(event) = update.into_event() else {
                continue;
            };
            engine
                .send(EngineCommand::Inbound(event))
                .context("engine stopped")?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn update(id: i64) -> Update {
        serde_json::from_value(serde_json::json!({ "update_id": id })).unwrap()
    }

    #[test]
    fn offset_moves_past_highest_update() {
        assert_eq!(next_offset(0, &[]), 0);
        assert_eq!(next_offset(0, &[update(5), update(9), update(7)]), 10);
        assert_eq!(next_offset(20, &[update(3)]), 20);
    }

    #[test]
    fn backoff_grows_and_caps() {
        let mut rng = StdRng::seed_from_u64(7);
        let first = backoff_delay(1, &mut rng);
        assert!(first >= Duration::from_millis(1_000) && first <= Duration::from_millis(1_250));
        let third = backoff_delay(3, &mut rng);
        assert!(third >= Duration::from_millis(4_000) && third <= Duration::from_millis(5_000));
        let late = backoff_delay(40, &mut rng);
        assert!(late >= Duration::from_millis(60_000) && late <= Duration::from_millis(75_000));
    }
}
