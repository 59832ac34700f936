//! Audio-only mode: an audio file in, the same audio with located cover
//! art out. The query comes from the file's performer/title tags.

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{Audio, InputFile};

use vidgencore::media::{assert_non_empty, download_to_file, merge_audio_image, TempArtifacts};

use super::types::{HandlerDeps, HandlerResult};
use crate::telegram::Bot;

const AUDIO_MODE_PROMPT: &str =
    "🎵 Audio Only Mode\n\nPlease send me an Audio file (MP3/M4A). I will automatically find the cover art.";

pub async fn handle_audio_message(bot: Bot, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let chat_id = msg.chat.id;
    let Some(audio) = msg.audio().cloned() else {
        bot.send_message(chat_id, AUDIO_MODE_PROMPT).await?;
        return Ok(());
    };

    let Some(_guard) = deps.locks.try_acquire(chat_id.0) else {
        log::info!("duplicate audio request for {}, ignoring", chat_id);
        return Ok(());
    };

    if let Err(e) = run_audio_mode(&bot, chat_id, &audio, &deps).await {
        log::error!("audio mode error for {}: {}", chat_id, e);
        bot.send_message(chat_id, format!("❌ Error: {}", e)).await?;
    }
    Ok(())
}

/// Builds the search query from file tags, falling back to the file name
/// with its extension stripped.
fn query_from_tags(title: Option<&str>, file_name: Option<&str>) -> Option<String> {
    if let Some(title) = title {
        return Some(title.to_string());
    }
    file_name.map(|name| {
        name.rsplit_once('.')
            .map(|(stem, _)| stem.to_string())
            .unwrap_or_else(|| name.to_string())
    })
}

async fn run_audio_mode(bot: &Bot, chat_id: ChatId, audio: &Audio, deps: &HandlerDeps) -> HandlerResult {
    let Some(title) = query_from_tags(audio.title.as_deref(), audio.file_name.as_deref()) else {
        bot.send_message(
            chat_id,
            "❌ I couldn't find Artist/Title tags in this file.\nPlease rename the file to 'Artist - Title' and send it again.",
        )
        .await?;
        return Ok(());
    };

    bot.send_message(chat_id, format!("🔍 Searching cover art for: \"{}\"...", title))
        .await?;

    let (cover_url, found) = deps.cover.cover_for_tags(audio.performer.as_deref(), &title).await;
    let display_title = found
        .map(|info| format!("{} - {}", info.artist, info.title))
        .unwrap_or_else(|| {
            match &audio.performer {
                Some(performer) => format!("{} - {}", performer, title),
                None => title.clone(),
            }
        });

    bot.send_message(chat_id, format!("✅ Found: {}\n⬇️ Downloading...", display_title))
        .await?;

    let artifacts = TempArtifacts::new();

    if let Err(e) = download_to_file(&deps.http, &cover_url, &artifacts.cover).await {
        log::warn!("cover download failed for {}: {}", chat_id, e);
    }

    // The audio itself comes from Telegram, not a provider.
    let file = bot.get_file(audio.file.id.clone()).await?;
    let mut dst = tokio::fs::File::create(&artifacts.audio).await?;
    bot.download_file(&file.path, &mut dst).await?;

    assert_non_empty(&artifacts.audio, "audio file")?;
    assert_non_empty(&artifacts.cover, "cover image")?;

    bot.send_message(chat_id, "Merging... 🎬").await?;
    merge_audio_image(&artifacts.cover, &artifacts.audio, &artifacts.output).await?;

    bot.send_message(chat_id, "🚀 Uploading...").await?;
    bot.send_video(chat_id, InputFile::file(artifacts.output.clone()))
        .caption(format!("🎵 {}\nGenerated by Vidgen", display_title))
        .await?;

    log::info!("audio mode video generated for {}: {}", chat_id, display_title);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::query_from_tags;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_title_tag_wins() {
        assert_eq!(
            query_from_tags(Some("Song Name"), Some("ignored.mp3")).as_deref(),
            Some("Song Name")
        );
    }

    #[test]
    fn test_file_name_fallback_strips_extension() {
        assert_eq!(
            query_from_tags(None, Some("Artist - Song.mp3")).as_deref(),
            Some("Artist - Song")
        );
        assert_eq!(query_from_tags(None, Some("noext")).as_deref(), Some("noext"));
    }

    #[test]
    fn test_no_tags_is_none() {
        assert_eq!(query_from_tags(None, None), None);
    }
}
