use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::inbound::Update;

const API_BASE: &str = "https://api.telegram.org";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Outbound side of the chat transport, as seen by the engine.
///
/// Failures never surface as errors: `send_message` returns `None` and
/// `edit_message` returns `false`, and the caller picks a fallback.
pub trait ChatTransport: Send {
    /// Publish `text`; returns the new message id.
    fn send_message(&self, chat_id: i64, text: &str) -> Option<i64>;

    /// Replace the text of an existing message.
    fn edit_message(&self, chat_id: i64, message_id: i64, text: &str) -> bool;
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
}

#[derive(Serialize)]
struct EditMessageRequest<'a> {
    chat_id: i64,
    message_id: i64,
    text: &'a str,
}

#[derive(Serialize)]
struct GetUpdatesRequest<'a> {
    offset: i64,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct SentMessageResult {
    message_id: i64,
}

/// Validates the `<bot id>:<secret>` shape of a bot token.
pub fn validate_token(token: &str) -> Result<()> {
    match token.split_once(':') {
        Some((id, secret)) if !id.is_empty() && !secret.is_empty() && !secret.contains(':') => {
            Ok(())
        }
        _ => Err(Error::Config {
            message: "invalid bot token format".into(),
        }),
    }
}

/// Blocking client for the Telegram Bot HTTP API.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(API_BASE, token)
    }

    pub fn with_base_url(api_base: &str, token: &str) -> Result<Self> {
        validate_token(token)?;
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        })
    }

    fn call<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T> {
        let resp: ApiResponse<T> = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .timeout(timeout)
            .json(body)
            .send()?
            .json()?;

        match (resp.ok, resp.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(Error::Telegram {
                description: resp
                    .description
                    .unwrap_or_else(|| format!("{} failed without description", method)),
            }),
        }
    }

    pub fn try_send_message(&self, chat_id: i64, text: &str) -> Result<i64> {
        let sent: SentMessageResult = self.call(
            "sendMessage",
            &SendMessageRequest { chat_id, text },
            REQUEST_TIMEOUT,
        )?;
        Ok(sent.message_id)
    }

    pub fn try_edit_message(&self, chat_id: i64, message_id: i64, text: &str) -> Result<()> {
        // editMessageText answers with the edited message or `true`.
        let _: serde_json::Value = self.call(
            "editMessageText",
            &EditMessageRequest {
                chat_id,
                message_id,
                text,
            },
            REQUEST_TIMEOUT,
        )?;
        Ok(())
    }

    /// Long-poll for updates after `offset`, waiting up to `timeout_secs`.
    pub fn get_updates(&self, offset: i64, timeout_secs: u64) -> Result<Vec<Update>> {
        self.call(
            "getUpdates",
            &GetUpdatesRequest {
                offset,
                timeout: timeout_secs,
                allowed_updates: &[
                    "message",
                    "edited_message",
                    "channel_post",
                    "edited_channel_post",
                ],
            },
            Duration::from_secs(timeout_secs) + REQUEST_TIMEOUT,
        )
    }

    /// Long polling is refused while a webhook is registered.
    pub fn delete_webhook(&self) -> Result<()> {
        let _: bool = self.call("deleteWebhook", &serde_json::json!({}), REQUEST_TIMEOUT)?;
        Ok(())
    }
}

impl ChatTransport for TelegramClient {
    fn send_message(&self, chat_id: i64, text: &str) -> Option<i64> {
        match self.try_send_message(chat_id, text) {
            Ok(id) => {
                debug!(chat_id, message_id = id, "message sent");
                Some(id)
            }
            Err(e) => {
                warn!(chat_id, error = %e, "send failed");
                None
            }
        }
    }

    fn edit_message(&self, chat_id: i64, message_id: i64, text: &str) -> bool {
        match self.try_edit_message(chat_id, message_id, text) {
            Ok(()) => {
                debug!(chat_id, message_id, "message edited");
                true
            }
            Err(e) => {
                warn!(chat_id, message_id, error = %e, "edit failed");
                false
            }
        }
    }
}
