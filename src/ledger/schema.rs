use anyhow::{Context, Result};
use sqlx::PgPool;

/// Initialize the PostgreSQL schema for the wallet ledger.
///
/// Every statement is idempotent, so this runs unconditionally at startup.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing wallet ledger schema...");

    sqlx::query(CREATE_WALLETS_TABLE)
        .execute(pool)
        .await
        .context("Failed to create wallets table")?;

    sqlx::query(CREATE_TRANSACTION_LOGS_TABLE)
        .execute(pool)
        .await
        .context("Failed to create transaction_logs table")?;

    for statement in CREATE_INDEXES {
        sqlx::query(statement)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to create index: {}", statement))?;
    }

    tracing::info!("Wallet ledger schema initialized successfully");
    Ok(())
}

const CREATE_WALLETS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS wallets (
    id          UUID PRIMARY KEY,
    owner_id    TEXT NOT NULL,
    balance     NUMERIC(19,4) NOT NULL DEFAULT 0 CHECK (balance >= 0),
    version     BIGINT NOT NULL DEFAULT 0,
    created_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

const CREATE_TRANSACTION_LOGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transaction_logs (
    id               UUID PRIMARY KEY,
    from_wallet_id   UUID NOT NULL,
    to_wallet_id     UUID NOT NULL,
    amount           NUMERIC(19,4) NOT NULL CHECK (amount > 0),
    status           TEXT NOT NULL DEFAULT 'PENDING',
    idempotency_key  VARCHAR(255) NOT NULL,
    error_message    TEXT,
    metadata         JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at       TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (from_wallet_id <> to_wallet_id)
)
"#;

const CREATE_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS wallets_owner_id_key ON wallets (owner_id)",
    "CREATE UNIQUE INDEX IF NOT EXISTS transaction_logs_idempotency_key_key ON transaction_logs (idempotency_key)",
    "CREATE INDEX IF NOT EXISTS transaction_logs_from_wallet_id_idx ON transaction_logs (from_wallet_id)",
    "CREATE INDEX IF NOT EXISTS transaction_logs_to_wallet_id_idx ON transaction_logs (to_wallet_id)",
    "CREATE INDEX IF NOT EXISTS transaction_logs_status_idx ON transaction_logs (status)",
    "CREATE INDEX IF NOT EXISTS transaction_logs_created_at_idx ON transaction_logs (created_at)",
];
