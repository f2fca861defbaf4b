use std::sync::Arc;

use crate::cache::CacheStore;
use crate::ledger::LedgerStore;
use crate::transfer::TransferCoordinator;

/// Shared gateway state.
///
/// All dependencies are explicitly constructed at startup and injected;
/// handlers never reach for process-wide singletons.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<TransferCoordinator>,
    pub ledger: Arc<dyn LedgerStore>,
    pub cache: Arc<dyn CacheStore>,
    /// Deployment environment; production suppresses error detail
    pub env: String,
}

impl AppState {
    pub fn new(
        coordinator: Arc<TransferCoordinator>,
        ledger: Arc<dyn LedgerStore>,
        cache: Arc<dyn CacheStore>,
        env: String,
    ) -> Self {
        Self {
            coordinator,
            ledger,
            cache,
            env,
        }
    }
}
