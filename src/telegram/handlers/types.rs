//! Handler types and dependencies

use std::sync::Arc;

use crate::relay::Relay;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub relay: Arc<Relay>,
}

impl HandlerDeps {
    pub fn new(relay: Arc<Relay>) -> Self {
        Self { relay }
    }
}
