//! Wallet Ledger Service
//!
//! Idempotent atomic money transfers between internally managed wallets.
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`logging`] - Tracing bootstrap
//! - [`db`] - PostgreSQL connection pool
//! - [`money`] - Fixed-point (19,4) helpers
//! - [`cache`] - Cache/lock store contract and in-memory implementation
//! - [`ledger`] - Ledger store seam, domain records, PostgreSQL implementation
//! - [`transfer`] - Validator, idempotency coordinator, error taxonomy
//! - [`gateway`] - HTTP adapter

pub mod cache;
pub mod config;
pub mod db;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod money;
pub mod transfer;

// Convenient re-exports at crate root
pub use cache::{CacheKeys, CacheStore, InMemoryCache};
pub use config::AppConfig;
pub use db::Database;
pub use ledger::{LedgerStore, LogStatus, TransactionLog, Wallet, lock_order, pg::PgLedger};
pub use transfer::{
    IdempotencyConfig, TransferCoordinator, TransferError, TransferOutcome, TransferRequest,
};
