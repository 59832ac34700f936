//! Bot construction and the public command surface.

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use teloxide::utils::command::BotCommands;

use vidgencore::config;

pub type Bot = teloxide::Bot;

/// Commands shown in the Telegram command menu.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Vidgen commands:")]
pub enum Command {
    #[command(description = "show the mode menu")]
    Start,
    #[command(description = "show the mode menu")]
    Modes,
    #[command(description = "how to use the bot")]
    Help,
    #[command(description = "cancel the current operation")]
    Cancel,
    #[command(description = "admin: show recent log lines")]
    Logs,
}

/// Creates the bot from the configured token.
pub fn create_bot() -> Bot {
    teloxide::Bot::new(config::BOT_TOKEN.clone())
}

/// The three-mode selection keyboard shown by /start and /modes.
pub fn mode_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new([
        [InlineKeyboardButton::callback(
            "📸 Manual Mode (Image + Audio)",
            "mode_manual",
        )],
        [InlineKeyboardButton::callback("🎵 Audio Only Mode ⭐ (Best!)", "mode_audio")],
        [InlineKeyboardButton::callback("🔗 Link Mode (50/50)", "mode_link")],
    ])
}

pub const HELP_TEXT: &str = "🆘 Vidgen Help\n\n\
Modes:\n\
📸 Manual: Send an Image, then send Audio.\n\
🎵 Audio Only: Send Audio, I'll find the cover art. (⭐ Most Reliable!)\n\
🔗 Link: Send a streaming link or song name. (⚠️ 50/50 - may not find audio)\n\n\
Commands:\n\
/modes - Show Mode Menu\n\
/cancel - Cancel current operation\n\
/help - Show this message";
