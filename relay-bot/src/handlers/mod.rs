//! Handlers in chain order: [`MediaHandler`] (non-text) → [`CommandHandler`] (`/start`,
//! `/info`, `/clear_history`) → [`RelayHandler`] (everything else, through the pipeline).

mod command;
mod media;
mod relay;

pub use command::{parse_command, BotCommand, CommandHandler};
pub use media::MediaHandler;
pub use relay::RelayHandler;
