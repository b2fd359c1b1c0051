//! Application state shared across handlers

use std::sync::Arc;

use agent_ledger_db::{LedgerStore, MemoryLedgerStore};
use agent_ledger_types::{Clock, SystemClock};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Ledger storage backend
    pub store: Arc<dyn LedgerStore>,
    /// Source of "now" and of the current spend window
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Empty in-memory store with the given clock
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(Arc::new(MemoryLedgerStore::new()), clock)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::in_memory(Arc::new(SystemClock::default()))
    }
}
