//! Domain records for wallets and transaction logs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Terminal tri-state of a logged transfer attempt.
///
/// PENDING is transient; SUCCESS and FAILED are terminal and never
/// transition again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStatus {
    Pending,
    Success,
    Failed,
}

impl LogStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Pending => "PENDING",
            LogStatus::Success => "SUCCESS",
            LogStatus::Failed => "FAILED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(LogStatus::Pending),
            "SUCCESS" => Some(LogStatus::Success),
            "FAILED" => Some(LogStatus::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LogStatus::Success | LogStatus::Failed)
    }
}

impl std::fmt::Display for LogStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Wallet account
#[derive(Debug, Clone)]
pub struct Wallet {
    pub id: Uuid,
    pub owner_id: String,
    pub balance: Decimal,
    /// Incremented on every balance mutation
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Durable record of one transfer attempt.
#[derive(Debug, Clone)]
pub struct TransactionLog {
    pub id: Uuid,
    pub from_wallet_id: Uuid,
    pub to_wallet_id: Uuid,
    pub amount: Decimal,
    pub status: LogStatus,
    pub idempotency_key: String,
    pub error_message: Option<String>,
    /// Carries requestedAt, plus completedAt and post-trade balances on
    /// SUCCESS, or failedAt on FAILED.
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionLog {
    /// String-valued metadata field, if present.
    pub fn metadata_str(&self, field: &str) -> Option<&str> {
        self.metadata.get(field).and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_roundtrip() {
        for status in [LogStatus::Pending, LogStatus::Success, LogStatus::Failed] {
            assert_eq!(LogStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(LogStatus::parse("COMMITTED"), None);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!LogStatus::Pending.is_terminal());
        assert!(LogStatus::Success.is_terminal());
        assert!(LogStatus::Failed.is_terminal());
    }
}
