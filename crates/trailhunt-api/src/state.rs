//! Shared application state.

use std::sync::Arc;

use trailhunt_game::application::hunt::Hunt;

use crate::outbox::OutboxMessenger;

/// Application state shared across all request handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The running hunt.
    pub hunt: Arc<Hunt>,
    /// Messages the hunt has sent, waiting to be collected.
    pub outbox: Arc<OutboxMessenger>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(hunt: Arc<Hunt>, outbox: Arc<OutboxMessenger>) -> Self {
        Self { hunt, outbox }
    }
}
