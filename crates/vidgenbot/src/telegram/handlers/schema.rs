//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::audio::handle_audio_message;
use super::commands::{handle_command, handle_mode_callback};
use super::manual::{handle_manual_audio, handle_photo_message};
use super::search::handle_search_message;
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// The same handler tree is used in production and in tests. Routing, top
/// to bottom: duplicate suppression, commands, photos (manual mode), audio
/// (manual merge when an image is stored, audio mode otherwise), then
/// plain text as search/link mode. Callback queries handle the mode
/// buttons.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_dedup = deps.clone();
    let deps_commands = deps.clone();
    let deps_photo = deps.clone();
    let deps_audio = deps.clone();
    let deps_text = deps.clone();

    dptree::entry()
        // Telegram redelivers updates; drop anything already processed.
        .branch(
            Update::filter_message()
                .filter(move |msg: Message| deps_dedup.dedup.seen_before(msg.chat.id.0, msg.id.0))
                .endpoint(|msg: Message| async move {
                    log::info!("duplicate update for chat {}, ignoring", msg.chat.id);
                    Ok(())
                }),
        )
        .branch(command_handler(deps_commands))
        .branch(photo_handler(deps_photo))
        .branch(audio_handler(deps_audio))
        .branch(text_handler(deps_text))
        .branch(callback_handler())
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move { handle_command(bot, msg, cmd, deps).await }
        })
}

fn photo_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.photo().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_photo_message(bot, msg, deps).await }
        })
}

fn audio_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.audio().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                // A stored image means this audio completes a manual-mode
                // pair; otherwise it's an audio-mode request.
                match deps.images.get(msg.chat.id.0) {
                    Some(image_file_id) => handle_manual_audio(bot, msg, deps.clone(), image_file_id).await,
                    None => handle_audio_message(bot, msg, deps.clone()).await,
                }
            }
        })
}

fn text_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            msg.text()
                .map(|text| !text.trim().is_empty() && !text.starts_with('/'))
                .unwrap_or(false)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_search_message(bot, msg, deps).await }
        })
}

fn callback_handler() -> UpdateHandler<HandlerError> {
    Update::filter_callback_query()
        .endpoint(move |bot: Bot, query: CallbackQuery| async move { handle_mode_callback(bot, query).await })
}
