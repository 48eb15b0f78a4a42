//! Application State

use std::sync::Arc;

use finance_advisor::{Advisor, SessionState};
use llm_core::MemorySessionStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Prompt orchestration over the configured LLM provider
    pub advisor: Arc<Advisor>,

    /// One entry per interactive session; nothing is shared between them
    pub sessions: Arc<MemorySessionStore<SessionState>>,
}

impl AppState {
    pub fn new(advisor: Advisor) -> Self {
        Self {
            advisor: Arc::new(advisor),
            sessions: Arc::new(MemorySessionStore::new()),
        }
    }
}
