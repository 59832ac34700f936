//! Command handlers: /start, /modes, /help, /cancel, /logs.

use teloxide::prelude::*;

use vidgencore::config;

use super::types::{HandlerDeps, HandlerResult};
use crate::telegram::bot::{mode_keyboard, Command, HELP_TEXT};
use crate::telegram::Bot;

/// How much of the log file tail /logs sends (Telegram caps messages at
/// 4096 characters).
const LOG_TAIL_CHARS: usize = 3500;

pub async fn handle_command(bot: Bot, msg: Message, cmd: Command, deps: HandlerDeps) -> HandlerResult {
    let chat_id = msg.chat.id;
    match cmd {
        Command::Start | Command::Modes => {
            bot.send_message(chat_id, "Welcome to Vidgen! 🎵🎥\nSelect a mode:")
                .reply_markup(mode_keyboard())
                .await?;
        }
        Command::Help => {
            bot.send_message(chat_id, HELP_TEXT).await?;
        }
        Command::Cancel => {
            deps.images.clear(chat_id.0);
            deps.locks.force_release(chat_id.0);
            bot.send_message(chat_id, "🚫 Operation cancelled. Locks released & state cleared.")
                .await?;
        }
        Command::Logs => {
            let user_id = msg.from.as_ref().map(|u| u.id.0 as i64);
            if config::ADMIN_USER_ID.is_none() || user_id != *config::ADMIN_USER_ID {
                bot.send_message(chat_id, "⛔ Access denied. Admin only.").await?;
                return Ok(());
            }
            bot.send_message(chat_id, format!("📋 Recent log lines:\n\n{}", log_tail()))
                .await?;
        }
    }
    Ok(())
}

fn log_tail() -> String {
    let content = fs_err::read_to_string(config::LOG_FILE_PATH.as_str()).unwrap_or_default();
    let mut lines: Vec<&str> = Vec::new();
    let mut total = 0;
    for line in content.lines().rev() {
        total += line.len() + 1;
        if total > LOG_TAIL_CHARS {
            break;
        }
        lines.push(line);
    }
    if lines.is_empty() {
        return "(log file is empty)".to_string();
    }
    lines.reverse();
    lines.join("\n")
}

/// Mode-selection button presses.
pub async fn handle_mode_callback(bot: Bot, query: CallbackQuery) -> HandlerResult {
    let chat_id = query.message.as_ref().map(|m| m.chat().id);

    if let (Some(chat_id), Some(data)) = (chat_id, query.data.as_deref()) {
        let prompt = match data {
            "mode_manual" => Some("📸 Manual Mode\n\nPlease send me an Image first."),
            "mode_audio" => Some("🎵 Audio Only Mode\n\nPlease send me an Audio file."),
            "mode_link" => Some(
                "🔗 Link/Search Mode\n\nSend me a link OR just type a Song Name.\n(e.g. 'Drake God's Plan' - hyphen is optional!)",
            ),
            _ => None,
        };
        if let Some(prompt) = prompt {
            bot.send_message(chat_id, prompt).await?;
        }
    }

    // Stop the button's loading animation either way.
    bot.answer_callback_query(query.id).await?;
    Ok(())
}
