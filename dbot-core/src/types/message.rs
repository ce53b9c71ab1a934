//! Message and message-kind types for the core model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{chat::Chat, user::User};

/// What the incoming message carries. Only [`MessageKind::Text`] reaches the backend; every other
/// kind gets a canned reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Text,
    Sticker,
    Photo,
    Video,
    Voice,
    VideoNote,
    Audio,
    Document,
    Animation,
    Contact,
    Location,
    Other,
}

impl MessageKind {
    /// Stable snake_case name, used for logging and phrase keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Sticker => "sticker",
            MessageKind::Photo => "photo",
            MessageKind::Video => "video",
            MessageKind::Voice => "voice",
            MessageKind::VideoNote => "video_note",
            MessageKind::Audio => "audio",
            MessageKind::Document => "document",
            MessageKind::Animation => "animation",
            MessageKind::Contact => "contact",
            MessageKind::Location => "location",
            MessageKind::Other => "other",
        }
    }
}

/// A single incoming message with user, chat and text content (empty for non-text kinds).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub user: User,
    pub chat: Chat,
    pub content: String,
    pub kind: MessageKind,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Builds a text message; mainly for tests and tools that drive the handler chain directly.
    pub fn text(id: impl Into<String>, user: User, chat: Chat, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            user,
            chat,
            content: content.into(),
            kind: MessageKind::Text,
            created_at: Utc::now(),
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == MessageKind::Text
    }
}
