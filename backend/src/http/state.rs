//! Application state for the HTTP server.

use std::sync::Arc;

use crate::services::Observatory;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Facade over calculators and cache
    pub observatory: Arc<Observatory>,
}

impl AppState {
    /// Create a new application state around an observatory.
    pub fn new(observatory: Arc<Observatory>) -> Self {
        Self { observatory }
    }
}
