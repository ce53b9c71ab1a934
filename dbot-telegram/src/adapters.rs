//! Adapters from Telegram (teloxide) types to dbot_core types.
//! Depends only on teloxide and dbot_core type definitions.

use dbot_core::{Chat, Message, MessageKind, ToCoreMessage, ToCoreUser, User};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Classifies what a Telegram message carries. Animations are checked before documents
/// because Telegram sends GIFs with both fields set.
pub fn message_kind(msg: &teloxide::types::Message) -> MessageKind {
    if msg.text().is_some() {
        MessageKind::Text
    } else if msg.sticker().is_some() {
        MessageKind::Sticker
    } else if msg.photo().is_some() {
        MessageKind::Photo
    } else if msg.video().is_some() {
        MessageKind::Video
    } else if msg.voice().is_some() {
        MessageKind::Voice
    } else if msg.video_note().is_some() {
        MessageKind::VideoNote
    } else if msg.audio().is_some() {
        MessageKind::Audio
    } else if msg.animation().is_some() {
        MessageKind::Animation
    } else if msg.document().is_some() {
        MessageKind::Document
    } else if msg.contact().is_some() {
        MessageKind::Contact
    } else if msg.location().is_some() {
        MessageKind::Location
    } else {
        MessageKind::Other
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        Message {
            id: self.0.id.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: self.0.chat.id.0,
                    username: None,
                    first_name: None,
                    last_name: None,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: self.chat_type().to_string(),
            },
            content: self.0.text().unwrap_or("").to_string(),
            kind: message_kind(self.0),
            created_at: self.0.date,
        }
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    fn chat_type(&self) -> &'static str {
        let chat = &self.0.chat;
        if chat.is_private() {
            "private"
        } else if chat.is_supergroup() {
            "supergroup"
        } else if chat.is_group() {
            "group"
        } else if chat.is_channel() {
            "channel"
        } else {
            "unknown"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Test: TelegramUserWrapper converts teloxide User to core User with correct id, username, first_name, last_name.**
    #[test]
    fn test_telegram_user_wrapper_to_core() {
        let user = teloxide::types::User {
            id: teloxide::types::UserId(123),
            is_bot: false,
            first_name: "Test".to_string(),
            last_name: Some("User".to_string()),
            username: Some("testuser".to_string()),
            language_code: Some("en".to_string()),
            is_premium: false,
            added_to_attachment_menu: false,
        };

        let core_user = TelegramUserWrapper(&user).to_core();

        assert_eq!(core_user.id, 123);
        assert_eq!(core_user.username, Some("testuser".to_string()));
        assert_eq!(core_user.first_name, Some("Test".to_string()));
        assert_eq!(core_user.last_name, Some("User".to_string()));
    }

    fn telegram_message(extra: serde_json::Value) -> teloxide::types::Message {
        let mut json = serde_json::json!({
            "message_id": 10,
            "date": 1706529600,
            "chat": {"id": 555, "type": "private", "first_name": "Ann"},
            "from": {"id": 555, "is_bot": false, "first_name": "Ann"}
        });
        if let (Some(base), Some(extra)) = (json.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                base.insert(k.clone(), v.clone());
            }
        }
        serde_json::from_value(json).unwrap()
    }

    /// **Test: Text message converts with content, kind Text and private chat type.**
    #[test]
    fn test_text_message_to_core() {
        let msg = telegram_message(serde_json::json!({"text": "Привет"}));
        let core = TelegramMessageWrapper(&msg).to_core();

        assert_eq!(core.id, "10");
        assert_eq!(core.content, "Привет");
        assert_eq!(core.kind, MessageKind::Text);
        assert_eq!(core.chat.id, 555);
        assert_eq!(core.chat.chat_type, "private");
        assert_eq!(core.user.id, 555);
    }

    /// **Test: Non-text messages get an empty content and their own kind.**
    #[test]
    fn test_non_text_kinds() {
        let contact = telegram_message(serde_json::json!({
            "contact": {"phone_number": "+10000000000", "first_name": "Bob"}
        }));
        assert_eq!(message_kind(&contact), MessageKind::Contact);
        assert_eq!(TelegramMessageWrapper(&contact).to_core().content, "");

        let location = telegram_message(serde_json::json!({
            "location": {"latitude": 55.03, "longitude": 82.92}
        }));
        assert_eq!(message_kind(&location), MessageKind::Location);
    }
}
