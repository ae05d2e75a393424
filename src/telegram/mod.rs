//! Telegram chat front end

pub mod bot;
pub mod handlers;

// Re-exports for convenience
pub use bot::{create_bot, setup_bot_profile, Command};
pub use handlers::{is_supported_link, schema, HandlerDeps, HandlerError};
