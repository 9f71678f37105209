use std::sync::mpsc::{Receiver, Sender};

use tracing::{debug, info, warn};

use crate::config::BotSettings;
use crate::engine::commands::{
    self, format_duration, format_success_rate, AdminCommand, RateLimiter, RedirectArgs,
    GREETING_TEXT, HELP_TEXT, PRIVATE_HINT_TEXT, RATE_LIMITED_TEXT, SUCCESS_RATE_WINDOW,
    UNAUTHORIZED_TEXT,
};
use crate::engine::cooldown::{unix_now, MAX_COOLDOWN_SECS, MIN_COOLDOWN_SECS};
use crate::engine::protocol::{EngineCommand, EngineResponse};
use crate::engine::state::EngineState;
use crate::engine::telegram_client::ChatTransport;
use crate::engine::{predictor, verifier};
use crate::model::inbound::{ChatMessage, InboundEvent};
use crate::model::prediction::SentMessage;

type Clock = Box<dyn Fn() -> f64 + Send>;

/// Owns all prediction state and processes inbound events one at a time, in the
/// order they were queued.
pub struct Engine {
    rx: Receiver<EngineCommand>,
    tx: Sender<EngineResponse>,
    transport: Box<dyn ChatTransport>,
    settings: BotSettings,
    state: EngineState,
    limiter: RateLimiter,
    clock: Clock,
}

impl Engine {
    pub fn new(
        rx: Receiver<EngineCommand>,
        tx: Sender<EngineResponse>,
        transport: Box<dyn ChatTransport>,
        settings: BotSettings,
        state: EngineState,
    ) -> Self {
        Self {
            rx,
            tx,
            transport,
            settings,
            state,
            limiter: RateLimiter::new(),
            clock: Box::new(unix_now),
        }
    }

    /// Replace the wall clock, in seconds since the Unix epoch.
    pub fn with_clock(mut self, clock: impl Fn() -> f64 + Send + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn run(&mut self) {
        info!(
            source = self.settings.source_channel_id,
            cooldown = self.state.gate.cooldown_secs(),
            "engine started"
        );
        while let Ok(cmd) = self.rx.recv() {
            match cmd {
                EngineCommand::Inbound(event) => self.handle_event(event),
                EngineCommand::Shutdown => break,
            }
        }
        info!("engine stopped");
    }

    fn respond(&self, response: EngineResponse) {
        let _ = self.tx.send(response);
    }

    pub fn handle_event(&mut self, event: InboundEvent) {
        let is_edit = event.is_edit();
        let msg = event.message();
        if msg.bot_joined && !is_edit {
            info!(chat_id = msg.chat_id, "added to a chat");
            self.reply(msg.chat_id, GREETING_TEXT);
        }
        let Some(text) = msg.text.as_deref() else {
            return;
        };
        let now = (self.clock)();

        if let (true, Some(user)) = (msg.is_private, msg.from_user_id) {
            if self.limiter.is_limited(user, now) {
                debug!(user, "rate limited");
                if !is_edit {
                    self.reply(msg.chat_id, RATE_LIMITED_TEXT);
                }
                return;
            }
        }

        if !is_edit {
            if let Some(command) = commands::parse(text) {
                self.handle_command(msg, command, now);
                return;
            }
        }

        if msg.is_private {
            if !is_edit {
                self.reply(msg.chat_id, PRIVATE_HINT_TEXT);
            }
            return;
        }

        if msg.sender_chat_id != self.settings.source_channel_id {
            debug!(sender = msg.sender_chat_id, "message from another channel ignored");
            return;
        }

        debug!(message_id = msg.message_id, is_edit, "processing source message");
        self.publish_prediction(msg, text, now);
        self.publish_resolution(msg, text);
    }

    fn publish_prediction(&mut self, msg: &ChatMessage, text: &str, now: f64) {
        let Some(decision) =
            predictor::evaluate(&mut self.state, text, Some(msg.message_id), now)
        else {
            return;
        };
        let target_round = decision.target_round();
        let prediction = predictor::make_prediction(&mut self.state, decision);
        let chat_id = self.settings.target_channel(msg.sender_chat_id);

        let message_id = self.transport.send_message(chat_id, &prediction);
        match message_id {
            Some(message_id) => {
                self.state
                    .store
                    .attach_message(target_round, SentMessage { chat_id, message_id });
                info!(target_round, chat_id, message_id, "prediction published");
            }
            None => warn!(target_round, chat_id, "prediction stored but not published"),
        }

        self.respond(EngineResponse::PredictionPublished {
            target_round,
            suit: decision.suit,
            chat_id,
            message_id,
            text: prediction,
        });
    }

    fn publish_resolution(&mut self, msg: &ChatMessage, text: &str) {
        let Some(resolution) = verifier::evaluate(&mut self.state, text) else {
            return;
        };
        let sent = self
            .state
            .store
            .get(resolution.target_round)
            .and_then(|r| r.sent);

        let edited = match sent {
            Some(sent) => {
                self.transport
                    .edit_message(sent.chat_id, sent.message_id, &resolution.new_text)
            }
            None => false,
        };
        if !edited {
            let chat_id = self.settings.target_channel(msg.sender_chat_id);
            warn!(
                target_round = resolution.target_round,
                chat_id,
                "edit unavailable, sending resolution as a new message"
            );
            self.transport.send_message(chat_id, &resolution.new_text);
        }

        self.respond(EngineResponse::PredictionResolved { resolution, edited });
    }

    fn reply(&self, chat_id: i64, text: &str) {
        self.transport.send_message(chat_id, text);
        self.respond(EngineResponse::CommandReplied {
            chat_id,
            text: text.to_string(),
        });
    }

    fn handle_command(&mut self, msg: &ChatMessage, command: AdminCommand, now: f64) {
        if !self.settings.is_admin(msg.from_user_id) {
            warn!(user = ?msg.from_user_id, ?command, "unauthorized command");
            // Resetting is often attempted in groups; stay silent there.
            if command != AdminCommand::Reset {
                self.reply(msg.chat_id, UNAUTHORIZED_TEXT);
            }
            return;
        }
        info!(user = ?msg.from_user_id, ?command, "admin command");

        let chat_id = msg.chat_id;
        match command {
            AdminCommand::Start | AdminCommand::Help => self.reply(chat_id, HELP_TEXT),

            AdminCommand::Status => {
                let text = format!(
                    "Pending predictions: {}\nCooldown: {} (next in {:.0}s)\nSuccess rate: {}\nSource: {} → {}",
                    self.state.store.pending_count(),
                    format_duration(self.state.gate.cooldown_secs()),
                    self.state.gate.remaining(now),
                    format_success_rate(self.state.store.success_rate(SUCCESS_RATE_WINDOW)),
                    self.settings.source_channel_id,
                    self.settings.target_channel(self.settings.source_channel_id),
                );
                self.reply(chat_id, &text);
            }

            AdminCommand::Cooldown(None) => {
                let text = format!(
                    "Current cooldown: {}s\nUse /cooldown <seconds> ({}-{}).",
                    self.state.gate.cooldown_secs(),
                    MIN_COOLDOWN_SECS,
                    MAX_COOLDOWN_SECS
                );
                self.reply(chat_id, &text);
            }
            AdminCommand::Cooldown(Some(Err(arg))) => {
                self.reply(chat_id, &format!("❌ Not a number of seconds: {}", arg));
            }
            AdminCommand::Cooldown(Some(Ok(secs))) => {
                let text = match self.state.gate.set_cooldown_secs(secs) {
                    Ok(old) => {
                        self.settings.cooldown_secs = secs;
                        format!(
                            "✅ Cooldown updated: {}s → {}s ({})",
                            old,
                            secs,
                            format_duration(secs)
                        )
                    }
                    Err(e) => format!("❌ {}", e),
                };
                self.reply(chat_id, &text);
            }

            AdminCommand::Redirect(RedirectArgs::List) => {
                let text = if self.settings.redirects.is_empty() {
                    format!(
                        "No redirection. Predictions go to {}.",
                        self.settings.default_target_channel_id
                    )
                } else {
                    self.settings
                        .redirects
                        .iter()
                        .map(|(source, target)| format!("📍 {} → {}", source, target))
                        .collect::<Vec<_>>()
                        .join("\n")
                };
                self.reply(chat_id, &text);
            }
            AdminCommand::Redirect(RedirectArgs::Clear) => {
                self.settings.clear_redirects();
                self.reply(chat_id, "✅ All redirections removed.");
            }
            AdminCommand::Redirect(RedirectArgs::Set { source, target }) => {
                self.settings.set_redirect(source, target);
                info!(source, target, "redirect configured");
                self.reply(chat_id, &format!("✅ Redirection: {} → {}", source, target));
            }
            AdminCommand::Redirect(RedirectArgs::Invalid) => {
                self.reply(
                    chat_id,
                    "❌ Usage: /redirect <source_id> <target_id> or /redirect clear",
                );
            }
            AdminCommand::Redi => {
                let source = self.settings.source_channel_id;
                self.settings.set_redirect(source, chat_id);
                self.reply(
                    chat_id,
                    &format!("✅ Predictions from {} now go to this chat.", source),
                );
            }

            AdminCommand::Reset => {
                self.state.reset();
                self.reply(chat_id, "✅ All predictions have been cleared.");
            }

            AdminCommand::Announce(None) => {
                self.reply(chat_id, "Usage: /announce <message>");
            }
            AdminCommand::Announce(Some(body)) => {
                let target = self.settings.target_channel(self.settings.source_channel_id);
                let announcement = format!(
                    "📢 ANNOUNCEMENT 📢\n\n{}\n\n📊 Success rate: {} (last {} verified predictions)",
                    body,
                    format_success_rate(self.state.store.success_rate(SUCCESS_RATE_WINDOW)),
                    SUCCESS_RATE_WINDOW
                );
                let text = match self.transport.send_message(target, &announcement) {
                    Some(_) => format!("✅ Announcement sent to {}.", target),
                    None => "❌ Announcement could not be sent.".to_string(),
                };
                self.reply(chat_id, &text);
            }
        }
    }
}
