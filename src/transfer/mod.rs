//! Transfer execution pipeline
//!
//! Validation, the three-tier idempotency protocol, and the data types that
//! flow between them. The ledger executor itself lives behind
//! [`crate::ledger::LedgerStore`].

pub mod coordinator;
pub mod error;
pub mod types;
pub mod validation;

pub use coordinator::{IdempotencyConfig, TransferCoordinator};
pub use error::TransferError;
pub use types::{AppliedTransfer, TransferOutcome, TransferRequest, ValidatedTransfer};
