//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::{handle_help_command, handle_start_command};
use super::links::handle_link_message;
use super::types::{HandlerDeps, HandlerError};
use crate::telegram::bot::Command;

/// Creates the dispatcher schema for the bot.
///
/// Commands are matched first; any other text starting with `https://` is
/// treated as a link request.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry()
        .branch(command_handler())
        .branch(link_handler(deps))
}

fn command_handler() -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        |bot: Bot, msg: Message, cmd: Command| async move {
            log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
            match cmd {
                Command::Start => handle_start_command(&bot, &msg).await,
                Command::Help => handle_help_command(&bot, &msg).await,
            }
        },
    ))
}

fn link_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().map(|t| t.trim_start().starts_with("https://")).unwrap_or(false))
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_link_message(&bot, &msg, &deps).await {
                    log::error!("Link handler failed for chat {}: {}", msg.chat.id, e);
                }
                Ok(())
            }
        })
}
