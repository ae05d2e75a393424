//! Bot initialization
//!
//! This module contains:
//! - Command enum definition
//! - Bot instance creation
//! - Command list and profile texts shown in the Telegram UI

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, TelegramConfig};

const DESCRIPTION: &str = "Send me a YouTube link and I will post it as a tagged MP3 to the channel.";
const SHORT_DESCRIPTION: &str = "YouTube audio to your channel";

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start,
    #[command(description = "Get help information")]
    Help,
}

/// Creates a Bot instance from `telegram` with the long network timeout
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Failed to build the HTTP client or parse `bot_api_url`
pub fn create_bot(telegram: &TelegramConfig) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(&telegram.bot_token, client);

    // Local Bot API server, if configured
    let bot = match telegram.bot_api_url.as_deref() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Sets the command list plus the long and short bot descriptions
pub async fn setup_bot_profile(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(vec![
        BotCommand::new("start", "Start the bot"),
        BotCommand::new("help", "Get help information"),
    ])
    .await?;
    bot.set_my_description().description(DESCRIPTION).await?;
    bot.set_my_short_description()
        .short_description(SHORT_DESCRIPTION)
        .await?;

    Ok(())
}
