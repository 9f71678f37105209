use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info};

use suit_mirror_bot::cli::Cli;
use suit_mirror_bot::config::settings_io::{load_settings, save_settings};
use suit_mirror_bot::engine::cooldown::{CooldownGate, TimestampFile};
use suit_mirror_bot::engine::dedup::SeenTexts;
use suit_mirror_bot::engine::engine::Engine;
use suit_mirror_bot::engine::poller;
use suit_mirror_bot::engine::protocol::{EngineCommand, EngineResponse};
use suit_mirror_bot::engine::state::EngineState;
use suit_mirror_bot::engine::telegram_client::TelegramClient;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = suit_mirror_bot::init_logging(cli.verbose, cli.log_file.as_deref(), cli.log_format.into()) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }
    info!(version = env!("CARGO_PKG_VERSION"), "suit_mirror_bot starting");

    let config_path = cli.config_path();
    let settings = load_settings(&config_path);
    if cli.write_default_config {
        save_settings(&config_path, &settings)
            .with_context(|| format!("writing {}", config_path.display()))?;
        info!(path = %config_path.display(), "settings written");
        return Ok(());
    }

    let client = TelegramClient::new(&cli.token).context("creating bot API client")?;

    let gate = CooldownGate::new(settings.cooldown_secs, TimestampFile::at(&cli.state_file));
    let state = EngineState::new(gate, SeenTexts::with_capacity(settings.dedup_capacity));

    let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
    let (resp_tx, resp_rx) = mpsc::channel::<EngineResponse>();
    let audit_thread = thread::spawn(move || {
        for response in resp_rx {
            debug!(?response, "engine response");
        }
    });

    let mut engine = Engine::new(cmd_rx, resp_tx, Box::new(client.clone()), settings, state);
    let engine_thread = thread::Builder::new()
        .name("engine".into())
        .spawn(move || engine.run())
        .context("spawning engine thread")?;

    let result = poller::run(&client, &cmd_tx, cli.poll_timeout);
    if let Err(e) = &result {
        error!(error = %e, "polling stopped");
    }

    let _ = cmd_tx.send(EngineCommand::Shutdown);
    let _ = engine_thread.join();
    let _ = audit_thread.join();
    result
}
