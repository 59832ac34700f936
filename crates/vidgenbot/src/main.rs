//! Vidgen — Telegram bot turning song references into album-cover videos.

use anyhow::Result;
use dotenvy::dotenv;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use vidgencore::core::{config, init_logger};

mod telegram;

use telegram::{create_bot, schema, Command, HandlerDeps};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present, before anything
    // reads the config statics.
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    // Catch panics from handler tasks so one bad update cannot take the
    // dispatcher down silently.
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    if config::BOT_TOKEN.is_empty() {
        anyhow::bail!("BOT_TOKEN (or TELOXIDE_TOKEN) is not set");
    }

    log::info!("Starting Vidgen bot...");
    if config::DEEMIX_SERVICE_URL_PRIMARY.is_none() && config::DEEMIX_SERVICE_URL_SECONDARY.is_none() {
        log::warn!("No Deemix service configured (DEEMIX_SERVICE_URL_PRIMARY/SECONDARY not set)");
    }
    if config::SPOTIFY_CLIENT_ID.is_none() {
        log::warn!("Spotify credentials not set; cover lookup will skip the Spotify stage");
    }

    let bot = create_bot();
    let deps = HandlerDeps::from_env();

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .default_handler(|update| async move {
            log::debug!("Unhandled update: {:?}", update.id);
        })
        .build()
        .dispatch()
        .await;

    log::info!("Bot stopped");
    Ok(())
}
