//! audiorelay - Telegram bot that relays YouTube audio into a channel
//!
//! A link sent to the bot is downloaded as MP3, tagged with title, artist
//! and cover art, and posted to a configured channel. Files within the Bot
//! API limit go through the bot; larger ones through a user session.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and shared helpers
//! - `download`: metadata, audio fetch, thumbnail, tagging pipeline
//! - `delivery`: size-based routing to the Bot API or MTProto uploader
//! - `relay`: one link in, one channel post out
//! - `telegram`: chat commands and link handling

pub mod cli;
pub mod core;
pub mod delivery;
pub mod download;
pub mod relay;
pub mod telegram;

// Re-export commonly used types for convenience
pub use core::{config, AppError, AppResult, Config};
pub use delivery::{DeliveryRouter, Uploader, BOT_API_UPLOAD_LIMIT};
pub use download::{AudioArtifact, AudioSource, Downloader};
pub use relay::{DeliveryOutcome, NoProgress, Relay, RelayProgress};
