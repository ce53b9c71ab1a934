//! # dbot-core
//!
//! Core types and traits for the relay bot: [`Bot`] (the chat transport), [`Handler`], message and
//! user types, errors, and tracing initialization. Transport-agnostic; used by dbot-telegram,
//! handler-chain and relay-bot.

pub mod bot;
pub mod error;
pub mod logger;
pub mod types;

pub use bot::{parse_message_id, Bot, ChatAction, CommandSpec, TextFormat};
pub use error::{DbotError, Result};
pub use logger::init_tracing;
pub use types::{
    Chat, Handler, HandlerResponse, Message, MessageKind, ToCoreMessage, ToCoreUser, User,
};
