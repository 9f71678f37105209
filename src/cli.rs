//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};

use crate::config::settings_io::default_settings_path;
use crate::engine::telegram_client::validate_token;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CliLogFormat {
    #[default]
    Text,
    Json,
}

impl From<CliLogFormat> for crate::LogFormat {
    fn from(fmt: CliLogFormat) -> Self {
        match fmt {
            CliLogFormat::Text => crate::LogFormat::Text,
            CliLogFormat::Json => crate::LogFormat::Json,
        }
    }
}

/// Publishes mirror-rule suit predictions and verifies them as rounds complete.
#[derive(Debug, Parser)]
#[command(name = "suit_mirror_bot", version)]
pub struct Cli {
    /// Bot API token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true, value_parser = parse_token)]
    pub token: String,

    /// Settings file (JSON)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// File holding the last prediction time
    #[arg(long = "state-file", value_name = "FILE", default_value = ".last_prediction_time")]
    pub state_file: PathBuf,

    /// Long-poll timeout for getUpdates
    #[arg(long = "poll-timeout", value_name = "SECONDS", default_value = "30")]
    pub poll_timeout: u64,

    /// Write the effective settings to the config file and exit
    #[arg(long = "write-default-config")]
    pub write_default_config: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbose: u8,

    /// Log to file instead of stderr
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[arg(long = "log-format", default_value = "text")]
    pub log_format: CliLogFormat,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(default_settings_path)
    }
}

fn parse_token(raw: &str) -> Result<String, String> {
    validate_token(raw).map_err(|e| e.to_string())?;
    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_args() {
        let cli = Cli::try_parse_from(["suit_mirror_bot", "--token", "1:abc"]).unwrap();
        assert_eq!(cli.token, "1:abc");
        assert_eq!(cli.poll_timeout, 30);
        assert_eq!(cli.state_file, PathBuf::from(".last_prediction_time"));
        assert_eq!(cli.log_format, CliLogFormat::Text);
    }

    #[test]
    fn rejects_malformed_token() {
        assert!(Cli::try_parse_from(["suit_mirror_bot", "--token", "nocolon"]).is_err());
    }

    #[test]
    fn verbosity_counts() {
        let cli =
            Cli::try_parse_from(["suit_mirror_bot", "--token", "1:abc", "-vvv"]).unwrap();
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn explicit_config_path() {
        let cli = Cli::try_parse_from([
            "suit_mirror_bot",
            "--token",
            "1:abc",
            "--config",
            "/tmp/bot.json",
        ])
        .unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/bot.json"));
    }
}
