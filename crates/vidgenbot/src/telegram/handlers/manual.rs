//! Manual mode: the user sends an image, then an audio file; the two are
//! merged. The image file id is remembered per chat for ten minutes.

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Audio, InputFile};

use vidgencore::media::{assert_non_empty, merge_audio_image, TempArtifacts};

use super::types::{HandlerDeps, HandlerResult};
use crate::telegram::Bot;

pub async fn handle_photo_message(bot: Bot, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let chat_id = msg.chat.id;
    let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) else {
        return Ok(());
    };

    deps.images.set(chat_id.0, photo.file.id.0.clone());
    log::info!("manual mode: stored image for {}", chat_id);

    bot.send_message(chat_id, "📸 Got image! Now send me an Audio file to merge.")
        .await?;
    Ok(())
}

/// Audio that arrived while an image is stored for the chat.
pub async fn handle_manual_audio(bot: Bot, msg: Message, deps: HandlerDeps, image_file_id: String) -> HandlerResult {
    let chat_id = msg.chat.id;
    let Some(audio) = msg.audio().cloned() else {
        return Ok(());
    };

    let Some(_guard) = deps.locks.try_acquire(chat_id.0) else {
        log::info!("duplicate manual request for {}, ignoring", chat_id);
        return Ok(());
    };

    if let Err(e) = run_manual_merge(&bot, chat_id, &audio, &image_file_id, &deps).await {
        log::error!("manual mode error for {}: {}", chat_id, e);
        bot.send_message(chat_id, format!("❌ Error: {}", e)).await?;
    }
    Ok(())
}

async fn run_manual_merge(
    bot: &Bot,
    chat_id: ChatId,
    audio: &Audio,
    image_file_id: &str,
    deps: &HandlerDeps,
) -> HandlerResult {
    bot.send_message(chat_id, "⬇️ Downloading your files...").await?;

    let artifacts = TempArtifacts::new();

    let image_file = bot.get_file(teloxide::types::FileId(image_file_id.to_string())).await?;
    let mut image_dst = tokio::fs::File::create(&artifacts.cover).await?;
    bot.download_file(&image_file.path, &mut image_dst).await?;

    let audio_file = bot.get_file(audio.file.id.clone()).await?;
    let mut audio_dst = tokio::fs::File::create(&artifacts.audio).await?;
    bot.download_file(&audio_file.path, &mut audio_dst).await?;

    assert_non_empty(&artifacts.cover, "image file")?;
    assert_non_empty(&artifacts.audio, "audio file")?;

    bot.send_message(chat_id, "Merging... 🎬").await?;
    merge_audio_image(&artifacts.cover, &artifacts.audio, &artifacts.output).await?;

    bot.send_message(chat_id, "🚀 Uploading...").await?;
    let caption = audio
        .title
        .clone()
        .map(|t| format!("🎵 {}\nGenerated by Vidgen", t))
        .unwrap_or_else(|| "Generated by Vidgen".to_string());
    bot.send_video(chat_id, InputFile::file(artifacts.output.clone()))
        .caption(caption)
        .await?;

    // The stored image is consumed by a successful merge.
    deps.images.clear(chat_id.0);
    log::info!("manual mode video generated for {}", chat_id);
    Ok(())
}
