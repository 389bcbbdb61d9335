use crate::store::AssayStore;

use std::sync::Arc;

/// Shared application state passed to each request handler.
pub struct AppState {
    /// Assay store queried by the handlers.
    pub store: Box<dyn AssayStore>,
}

impl AppState {
    /// Create and return an [AppState].
    ///
    /// # Arguments
    ///
    /// * `store`: Assay store to serve data from
    pub fn new(store: Box<dyn AssayStore>) -> Self {
        Self { store }
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
