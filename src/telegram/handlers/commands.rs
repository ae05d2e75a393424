//! /start and /help

use teloxide::prelude::*;
use teloxide::types::{Message, ParseMode};

use super::types::HandlerError;
use crate::core::utils::escape_html;

pub(super) fn start_text(first_name: &str) -> String {
    format!(
        "<b>🎵 Welcome to the YouTube Audio Downloader Bot! 🎵</b>\n\n\
         Hi <b>{}</b>! 👋\n\n\
         I save YouTube videos as tagged <b>audio files</b>.\n\n\
         <b>How it works:</b>\n\
         1️⃣ Send me a YouTube video link\n\
         2️⃣ I convert it to MP3 with title, artist and cover\n\
         3️⃣ The file is posted to your <b>channel</b>\n\n\
         <i>Send me a link to get started!</i>",
        escape_html(first_name)
    )
}

pub(super) const HELP_TEXT: &str = "Here are the commands you can use:\n\
     /start - Start the bot\n\
     /help - Get help information\n\n\
     Any youtube.com/watch or youtu.be link is downloaded and posted to the channel.";

pub(super) async fn handle_start_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    let first_name = msg.from.as_ref().map(|u| u.first_name.as_str()).unwrap_or("there");
    bot.send_message(msg.chat.id, start_text(first_name))
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

pub(super) async fn handle_help_command(bot: &Bot, msg: &Message) -> Result<(), HandlerError> {
    bot.send_message(msg.chat.id, HELP_TEXT).await?;
    Ok(())
}
