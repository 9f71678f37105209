//! Error types for the bot.

use thiserror::Error;

/// Main error type for transport, persistence and configuration failures.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading or writing local state.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request to the chat API failed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The chat API answered with `ok: false`.
    #[error("telegram error: {description}")]
    Telegram { description: String },

    /// Invalid configuration value.
    #[error("config error: {message}")]
    Config { message: String },
}

impl Error {
    /// Returns true if retrying the same request later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Io(_))
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_telegram() {
        let err = Error::Telegram {
            description: "Bad Request: message is not modified".into(),
        };
        assert_eq!(
            err.to_string(),
            "telegram error: Bad Request: message is not modified"
        );
    }

    #[test]
    fn error_display_config() {
        let err = Error::Config {
            message: "invalid bot token format".into(),
        };
        assert_eq!(err.to_string(), "config error: invalid bot token format");
    }

    #[test]
    fn io_errors_are_transient() {
        let err = Error::from(std::io::Error::other("boom"));
        assert!(err.is_transient());
        assert!(!Error::Config { message: String::new() }.is_transient());
    }
}
