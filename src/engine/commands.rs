//! Admin commands and the private-chat rate limiter.

use std::collections::{HashMap, VecDeque};

pub const MAX_MESSAGES_PER_WINDOW: usize = 30;
pub const RATE_LIMIT_WINDOW_SECS: f64 = 60.0;
pub const SUCCESS_RATE_WINDOW: usize = 20;

pub const HELP_TEXT: &str = "Commands:\n\
/status - pending predictions, cooldown and success rate\n\
/cooldown [seconds] - show or set the delay between predictions (30-600)\n\
/redirect [source target | clear] - list, add or clear redirections\n\
/redi - send predictions from the source channel to this chat\n\
/reset - clear every prediction and the cooldown\n\
/announce <text> - post an announcement to the prediction channel";

pub const GREETING_TEXT: &str = "🎭 Hello! I analyze card rounds and publish predictions.\n\
Use /help to see the available commands.";
pub const PRIVATE_HINT_TEXT: &str = "🎭 Hello! Use /help to see the available commands.\n\n\
Add me to a channel so I can analyze the cards! 🎴";

pub const UNAUTHORIZED_TEXT: &str = "🚫 You are not allowed to use this bot.";
pub const RATE_LIMITED_TEXT: &str = "⏰ Please wait before sending another command.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectArgs {
    List,
    Clear,
    Set { source: i64, target: i64 },
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Start,
    Help,
    Status,
    /// `None` shows the current value; `Some(Err)` carries the unparsable argument.
    Cooldown(Option<Result<u64, String>>),
    Redirect(RedirectArgs),
    Redi,
    Reset,
    Announce(Option<String>),
}

/// Parse a `/command [args]` message. Returns `None` for anything else, including
/// unknown commands.
pub fn parse(text: &str) -> Option<AdminCommand> {
    let text = text.trim();
    if !text.starts_with('/') {
        return None;
    }
    let (head, rest) = match text.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (text, ""),
    };
    // `/cmd@bot_name` is how groups address one bot.
    let name = head[1..].split('@').next().unwrap_or_default();

    let command = match name {
        "start" => AdminCommand::Start,
        "help" => AdminCommand::Help,
        "status" => AdminCommand::Status,
        "cooldown" => AdminCommand::Cooldown(
            rest.split_whitespace()
                .next()
                .map(|arg| arg.parse::<u64>().map_err(|_| arg.to_string())),
        ),
        "redirect" => AdminCommand::Redirect(parse_redirect(rest)),
        "redi" => AdminCommand::Redi,
        "reset" => AdminCommand::Reset,
        "announce" => AdminCommand::Announce((!rest.is_empty()).then(|| rest.to_string())),
        _ => return None,
    };
    Some(command)
}

fn parse_redirect(rest: &str) -> RedirectArgs {
    let parts: Vec<&str> = rest.split_whitespace().collect();
    match parts.as_slice() {
        [] => RedirectArgs::List,
        ["clear"] => RedirectArgs::Clear,
        [source, target] => match (source.parse(), target.parse()) {
            (Ok(source), Ok(target)) => RedirectArgs::Set { source, target },
            _ => RedirectArgs::Invalid,
        },
        _ => RedirectArgs::Invalid,
    }
}

/// Renders `90` as `1m30s` and `45` as `45s`.
pub fn format_duration(secs: u64) -> String {
    let (minutes, seconds) = (secs / 60, secs % 60);
    if minutes > 0 {
        format!("{}m{:02}s", minutes, seconds)
    } else {
        format!("{}s", secs)
    }
}

pub fn format_success_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.1}%", rate),
        None => "n/a".to_string(),
    }
}

/// Sliding-window message counter per user.
#[derive(Debug, Default)]
pub struct RateLimiter {
    history: HashMap<i64, VecDeque<f64>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the message unless the user is already over the limit.
    pub fn is_limited(&mut self, user_id: i64, now: f64) -> bool {
        self.history.retain(|_, times| {
            while times
                .front()
                .is_some_and(|t| now - *t >= RATE_LIMIT_WINDOW_SECS)
            {
                times.pop_front();
            }
            !times.is_empty()
        });

        let times = self.history.entry(user_id).or_default();
        if times.len() >= MAX_MESSAGES_PER_WINDOW {
            return true;
        }
        times.push_back(now);
        false
    }

    /// Users with at least one message inside the current window.
    pub fn tracked_users(&self) -> usize {
        self.history.len()
    }
}
