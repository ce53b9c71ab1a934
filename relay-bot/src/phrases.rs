//! Phrase and message bundle: random "thinking" phrases, fallback text and canned replies.
//!
//! Loaded from a JSON object of `category -> [phrases]`. Missing categories fall back to
//! built-in texts, so a partial (or absent) file is fine.

use rand::seq::SliceRandom;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

pub const THINKING: &str = "thinking";
pub const FALLBACK: &str = "fallback";
pub const BUSY: &str = "busy";
pub const START: &str = "start";
pub const INFO: &str = "info";
pub const RESET_OK: &str = "reset_ok";
pub const RESET_FAILED: &str = "reset_failed";

/// Returned by [`PhraseBook::random`] for unknown or empty categories.
pub const UNKNOWN_PHRASE: &str = "...";

const START_TEXT: &str = "Привет, меня зовут Менон! Я виртуальный помощник Новосибирского Государственного Университета!
Мои разработчики попросили сообщить вам следующее, прежде чем вы начнёте мной пользоваться:

Данная нейронная сеть предназначена для предоставления информации и ответов на вопросы, касаемых Новосибирского Государственного Университета. 
Однако, она может генерировать ответы, которые могут быть восприняты как оскорбительные, дискриминационные или неподобающие. \
Пользователь обязан самостоятельно оценивать и фильтровать как вводные, так и полученные данные. 
Команда разработчиков не несет ответственности за любые последствия, возникшие в результате использования данной нейронной сети, \
включая, но не ограничиваясь, моральный ущерб, дискриминацию или нарушение прав третьих лиц.";

const INFO_TEXT: &str = "Меня зовут Менон, я чат-бот Новосибирского Государственного Университета. \
Моя задача — помогать вам получать ответы на вопросы, связанные с НГУ, образовательными программами, \
поступлением и жизнью в Академгородке.

Я работаю на основе большой языковой модели с поддержкой поиска по базе знаний университета 📚.

Иногда я могу генерировать ответы, которые могут быть восприняты как оскорбительные, дискриминационные или неподобающие. \
Пользователь обязан самостоятельно оценивать и фильтровать как вводные, так и полученные данные. \
Команда разработчиков не несёт ответственности за любые последствия, возникшие в результате использования данной нейронной сети, \
включая, но не ограничиваясь, моральный ущерб, дискриминацию или нарушение прав третьих лиц.";

fn default_text(key: &str) -> Option<&'static str> {
    let text = match key {
        THINKING => "Печатаю ответ...",
        FALLBACK => "Не удалось получить ответ.",
        BUSY => "⏳ Пожалуйста, дождитесь ответа на предыдущий запрос.",
        START => START_TEXT,
        INFO => INFO_TEXT,
        RESET_OK => "🧹Начнём с чистого листа, я всё забыл! 😶‍🌫️",
        RESET_FAILED => "Ой-ой, что-то пошло не так, скоро меня починят😖",
        "media_sticker" => "🧸 Стикеры — это весело, но я умею только читать текст. Спросите меня что-нибудь текстом!",
        "media_photo" => "📸 Картинки — это замечательно! Но я пока не понимаю изображения. Попробуйте написать мне вопрос текстом!",
        "media_video" => "🎬 Видео — это здорово, но я разбираюсь только в тексте. Спросите меня что-нибудь!",
        "media_voice" => "🎤 Голос услышал, но мне бы текст — так я точно пойму и отвечу!",
        "media_video_note" => "🎥 Кружочки прикольные, но я пока не умею их понимать. Попробуйте текстом, так веселее!",
        "media_audio" => "🎧 Музыку люблю, но я бот-помощник, так что давайте пообщаемся текстом!",
        "media_document" => "📄 Файлы — это важно, но пока что я умею работать только с текстом. Спросите меня что-нибудь интересное!",
        "media_animation" => "🎞️ Гифка засчитана! Но текст — моё всё. Жду вопросик в виде слов!",
        "media_contact" => "📇 Контакт получил, но я предпочитаю текстовые беседы!",
        "media_location" => "📍 Место зафиксировал! А я вот в НГУ нахожусь, можете меня что-нибудь спросить текстом!",
        "media_unknown" => "🤷 К сожалению, я пока умею понимать только текст. Напишите мне словами, и я постараюсь помочь!",
        _ => return None,
    };
    Some(text)
}

/// Category → phrases lookup with built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct PhraseBook {
    categories: HashMap<String, Vec<String>>,
}

impl PhraseBook {
    /// Built-in texts only.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Reads `path`; a missing or invalid file is logged and yields the built-in texts.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Phrase file not readable; using built-in phrases");
                return Self::with_defaults();
            }
        };
        match Self::from_json(&raw) {
            Ok(book) => {
                info!(path = %path.display(), categories = book.categories.len(), "Phrases loaded");
                book
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Phrase file is not valid JSON; using built-in phrases");
                Self::with_defaults()
            }
        }
    }

    fn phrases(&self, category: &str) -> Option<&[String]> {
        self.categories
            .get(category)
            .map(Vec::as_slice)
            .filter(|phrases| !phrases.is_empty())
    }

    /// A random phrase of `category`; the built-in text, or `"..."` when nothing is known.
    pub fn random(&self, category: &str) -> String {
        match self.phrases(category) {
            Some(phrases) => phrases
                .choose(&mut rand::thread_rng())
                .cloned()
                .unwrap_or_else(|| UNKNOWN_PHRASE.to_string()),
            None => default_text(category)
                .unwrap_or(UNKNOWN_PHRASE)
                .to_string(),
        }
    }

    /// First phrase of `key`, else the built-in text, else `"..."`.
    pub fn message(&self, key: &str) -> String {
        self.phrases(key)
            .and_then(|phrases| phrases.first().cloned())
            .or_else(|| default_text(key).map(str::to_string))
            .unwrap_or_else(|| UNKNOWN_PHRASE.to_string())
    }
}
