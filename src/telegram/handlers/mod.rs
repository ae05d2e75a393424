//! Telegram bot handler tree configuration
//!
//! The same schema is used in production and can be driven from tests.

mod commands;
mod links;
mod schema;
mod types;

pub use links::is_supported_link;
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
