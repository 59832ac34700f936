//! Search/link mode: free text or a link in, cover video out.

use teloxide::prelude::*;
use teloxide::types::InputFile;

use vidgencore::media::{assert_non_empty, download_to_file, merge_audio_image, TempArtifacts};
use vidgencore::resolve::normalize::{is_plain_url, is_streaming_link};
use vidgencore::{AppError, ResolveOutcome};

use super::types::{HandlerDeps, HandlerResult};
use crate::telegram::Bot;

/// Entry point for a plain text message: resolves the query and produces
/// the video. A request already in flight for this chat silently wins —
/// the newcomer is dropped, never queued.
pub async fn handle_search_message(bot: Bot, msg: Message, deps: HandlerDeps) -> HandlerResult {
    let chat_id = msg.chat.id;
    let Some(text) = msg.text().map(str::to_owned) else {
        return Ok(());
    };

    log::info!("search mode started for {}: \"{}\"", chat_id, text);

    let Some(_guard) = deps.locks.try_acquire(chat_id.0) else {
        log::info!("duplicate search request for {}, ignoring", chat_id);
        return Ok(());
    };

    if let Err(e) = run_search(&bot, chat_id, &text, &deps).await {
        log::error!("search mode error for {}: {}", chat_id, e);
        bot.send_message(chat_id, format!("❌ Error: {}", e)).await?;
    }
    Ok(())
}

/// The pipeline under the lock. Fatal asset/merge errors propagate to the
/// caller for the user-facing error message; input problems and no-match
/// are reported here as normal outcomes.
async fn run_search(bot: &Bot, chat_id: ChatId, text: &str, deps: &HandlerDeps) -> HandlerResult {
    if is_streaming_link(text) {
        bot.send_message(chat_id, "🔗 Reading link metadata... 🕵️").await?;
    } else if is_plain_url(text) {
        bot.send_message(chat_id, "🔗 Processing link...").await?;
    }

    let outcome = match deps.resolver.resolve(text).await {
        Ok(outcome) => outcome,
        Err(AppError::LinkMetadata(e)) => {
            log::warn!("link metadata failed for {}: {}", chat_id, e);
            let reply = if text.contains("amazon") {
                "⚠️ Amazon Music links are tricky to read. Please type the 'Track Name Artist' manually."
            } else {
                "⚠️ Couldn't read link metadata. Please type the 'Track Name Artist' manually."
            };
            bot.send_message(chat_id, reply).await?;
            return Ok(());
        }
        Err(AppError::EmptyQuery) => {
            bot.send_message(chat_id, "Please type the 'Track Name Artist' to search.")
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let (track, target) = match outcome {
        ResolveOutcome::Resolved { track, target } => (track, target),
        ResolveOutcome::NoMatch => {
            bot.send_message(
                chat_id,
                "No match found 💔\n\n💡 Tip: Try typing the 'Track Name Artist' manually.",
            )
            .await?;
            return Ok(());
        }
    };

    bot.send_message(chat_id, format!("✅ Found: {}\n⬇️ Downloading...", track.title))
        .await?;

    // Cover lookup runs independently of which provider supplied the audio.
    let fallback_query = match &target {
        Some(t) => t.search_terms(),
        None => track.title.clone(),
    };
    let cover_url = deps.cover.resolve_cover(target.as_ref(), &fallback_query).await;

    let artifacts = TempArtifacts::new();

    if let Err(e) = download_to_file(&deps.http, &cover_url, &artifacts.cover).await {
        // Tolerated here; the integrity check below decides the outcome.
        log::warn!("cover download failed for {}: {}", chat_id, e);
    }

    deps.extractor.download_audio(&track.audio_locator, &artifacts.audio).await?;
    assert_non_empty(&artifacts.audio, "downloaded audio")?;
    assert_non_empty(&artifacts.cover, "cover image")?;

    bot.send_message(chat_id, "Merging... 🎬").await?;
    merge_audio_image(&artifacts.cover, &artifacts.audio, &artifacts.output).await?;

    bot.send_message(chat_id, "🚀 Uploading...").await?;
    bot.send_video(chat_id, InputFile::file(artifacts.output.clone()))
        .caption(format!("🎵 {}\nGenerated by Vidgen", track.title))
        .await?;

    log::info!("video generated for {}: {}", chat_id, track.title);
    Ok(())
}
