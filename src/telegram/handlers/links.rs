//! Link messages: validate, relay, report back.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, Message, MessageId, ParseMode, ReplyParameters};

use super::types::{HandlerDeps, HandlerError};
use crate::core::utils::escape_html;
use crate::download::AudioArtifact;
use crate::relay::{DeliveryOutcome, RelayProgress};

const SUPPORTED_PREFIXES: &[&str] = &[
    "https://www.youtube.com/watch?",
    "https://youtube.com/watch?",
    "https://youtu.be/",
    "https://music.youtube.com/watch?",
];

pub(super) const INVALID_URL_TEXT: &str = "Invalid URL";
pub(super) const DOWNLOADING_TEXT: &str = "Downloading ...";
pub(super) const FAILURE_TEXT: &str = "An error occurred";

/// Whether the bot can relay this link.
pub fn is_supported_link(text: &str) -> bool {
    let text = text.trim();
    SUPPORTED_PREFIXES.iter().any(|prefix| text.starts_with(prefix))
}

fn uploading_text(title: &str) -> String {
    format!(
        "🎵 <b>{}</b>\n\nDownloading - DONE\nUploading ...",
        escape_html(title)
    )
}

fn done_text(title: &str) -> String {
    format!(
        "<b>🎵 {}</b>\n\nSuccessfully uploaded to the channel.",
        escape_html(title)
    )
}

/// Mirrors relay phases into the requesting chat
struct ChatProgress<'a> {
    bot: &'a Bot,
    chat_id: ChatId,
    status_id: MessageId,
}

#[async_trait]
impl<'a> RelayProgress for ChatProgress<'a> {
    async fn downloaded(&self, artifact: &AudioArtifact) {
        if let Err(e) = self
            .bot
            .edit_message_text(self.chat_id, self.status_id, uploading_text(&artifact.title))
            .parse_mode(ParseMode::Html)
            .await
        {
            log::warn!("Failed to update status message: {}", e);
        }
    }

    async fn delivered(&self, artifact: &AudioArtifact) {
        let text = done_text(&artifact.title);
        let photo = self
            .bot
            .send_photo(self.chat_id, InputFile::file(artifact.thumbnail_path.clone()))
            .caption(text.clone())
            .parse_mode(ParseMode::Html)
            .await;
        if let Err(e) = photo {
            log::warn!("Failed to send cover with done notice, sending text: {}", e);
            if let Err(e) = self.bot.send_message(self.chat_id, text).parse_mode(ParseMode::Html).await {
                log::warn!("Failed to send done notice: {}", e);
            }
        }
    }
}

pub(super) async fn handle_link_message(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let url = text.trim();

    if !is_supported_link(url) {
        bot.send_message(msg.chat.id, INVALID_URL_TEXT)
            .reply_parameters(ReplyParameters::new(msg.id))
            .await?;
        return Ok(());
    }

    log::info!("Link from chat {}: {}", msg.chat.id, url);
    let status = bot
        .send_message(msg.chat.id, DOWNLOADING_TEXT)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    let progress = ChatProgress {
        bot,
        chat_id: msg.chat.id,
        status_id: status.id,
    };
    match deps.relay.handle_link_with(url, &progress).await {
        DeliveryOutcome::Delivered { .. } => {
            if let Err(e) = bot.delete_message(msg.chat.id, status.id).await {
                log::warn!("Failed to delete status message: {}", e);
            }
            if let Err(e) = bot.delete_message(msg.chat.id, msg.id).await {
                log::warn!("Failed to delete request message: {}", e);
            }
        }
        DeliveryOutcome::DownloadFailed(reason) => {
            log::error!("An error occurred while downloading audio: {}", reason);
            bot.edit_message_text(msg.chat.id, status.id, FAILURE_TEXT).await?;
        }
        DeliveryOutcome::UploadFailed(reason) => {
            log::error!("An error occurred while uploading the file: {}", reason);
            bot.edit_message_text(msg.chat.id, status.id, FAILURE_TEXT).await?;
        }
    }

    Ok(())
}
