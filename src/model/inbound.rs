use serde::{Deserialize, Serialize};

/// One entry of a `getUpdates` reply. Unknown update kinds deserialize with every
/// optional field empty and are dropped by [`Update::into_event`].
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<TelegramMessage>,
    #[serde(default)]
    pub edited_message: Option<TelegramMessage>,
    #[serde(default)]
    pub channel_post: Option<TelegramMessage>,
    #[serde(default)]
    pub edited_channel_post: Option<TelegramMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub sender_chat: Option<Chat>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub new_chat_members: Vec<User>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
}

/// Transport-independent message handed to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub chat_id: i64,
    /// Channel the message was posted on behalf of; falls back to `chat_id`.
    pub sender_chat_id: i64,
    pub message_id: i64,
    pub from_user_id: Option<i64>,
    pub is_private: bool,
    pub text: Option<String>,
    /// A bot was among the members added to the chat by this message.
    #[serde(default)]
    pub bot_joined: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InboundEvent {
    New(ChatMessage),
    Edited(ChatMessage),
}

impl InboundEvent {
    pub fn message(&self) -> &ChatMessage {
        match self {
            InboundEvent::New(m) | InboundEvent::Edited(m) => m,
        }
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, InboundEvent::Edited(_))
    }
}

impl From<TelegramMessage> for ChatMessage {
    fn from(msg: TelegramMessage) -> Self {
        ChatMessage {
            chat_id: msg.chat.id,
            sender_chat_id: msg.sender_chat.as_ref().map_or(msg.chat.id, |c| c.id),
            message_id: msg.message_id,
            from_user_id: msg.from.map(|u| u.id),
            is_private: msg.chat.kind.as_deref() == Some("private"),
            text: msg.text,
            bot_joined: msg.new_chat_members.iter().any(|u| u.is_bot),
        }
    }
}

impl Update {
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(m) = self.message.or(self.channel_post) {
            return Some(InboundEvent::New(m.into()));
        }
        self.edited_message
            .or(self.edited_channel_post)
            .map(|m| InboundEvent::Edited(m.into()))
    }
}
