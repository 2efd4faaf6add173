// ABOUTME: Shared state handed to every HTTP handler.
// ABOUTME: Wraps the orchestrator so concurrent requests share one port allocator.

use std::sync::Arc;

use crate::deploy::Orchestrator;

pub struct AppState<R> {
    pub orchestrator: Arc<Orchestrator<R>>,
}

impl<R> AppState<R> {
    pub fn new(orchestrator: Arc<Orchestrator<R>>) -> Self {
        Self { orchestrator }
    }
}

// Derive would require R: Clone.
impl<R> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
        }
    }
}
