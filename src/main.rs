use std::sync::Arc;

use anyhow::Result;

use wallet_ledger::cache::{CacheKeys, CacheStore, InMemoryCache};
use wallet_ledger::config::AppConfig;
use wallet_ledger::db::Database;
use wallet_ledger::gateway::{self, state::AppState};
use wallet_ledger::ledger::{LedgerStore, pg::PgLedger, schema};
use wallet_ledger::transfer::{IdempotencyConfig, TransferCoordinator};
use wallet_ledger::logging;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env()?;
    let _log_guard = logging::init_logging(&config);

    tracing::info!(
        env = %config.env,
        revision = env!("WALLET_LEDGER_REVISION"),
        "Starting wallet-ledger"
    );

    let db = Database::connect_with_retry(&config.database).await?;
    schema::init_schema(db.pool()).await?;

    let cache: Arc<dyn CacheStore> = Arc::new(InMemoryCache::new());
    if std::env::var("CACHE_HOST").is_ok() {
        tracing::info!(
            host = %config.cache.host,
            port = config.cache.port,
            "CACHE_* configured; this build runs the in-process cache store"
        );
    }

    let ledger: Arc<dyn LedgerStore> = Arc::new(PgLedger::new(db.pool().clone()));

    let coordinator = Arc::new(TransferCoordinator::new(
        ledger.clone(),
        cache.clone(),
        CacheKeys::new(&config.cache.key_prefix),
        IdempotencyConfig::from(&config),
    ));

    let state = Arc::new(AppState::new(
        coordinator,
        ledger,
        cache,
        config.env.clone(),
    ));

    gateway::run_server(config.port, state).await
}
