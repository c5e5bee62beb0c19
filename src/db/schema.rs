//! Ledger schema DDL
//!
//! Idempotent; executed at every startup. There is no migration history.

use anyhow::{Context, Result};
use sqlx::PgPool;

pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    username        VARCHAR(64)  PRIMARY KEY,
    full_name       VARCHAR(128) NOT NULL,
    email           VARCHAR(256) NOT NULL UNIQUE,
    hashed_password TEXT         NOT NULL,
    created_at      TIMESTAMPTZ  NOT NULL DEFAULT NOW()
)
"#;

pub const CREATE_ACCOUNTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    id         BIGSERIAL   PRIMARY KEY,
    owner      VARCHAR(64) NOT NULL,
    balance    BIGINT      NOT NULL DEFAULT 0 CHECK (balance >= 0),
    currency   VARCHAR(3)  NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    deleted_at TIMESTAMPTZ
)
"#;

/// One live account per (owner, currency); soft-deleted rows don't count
pub const CREATE_ACCOUNTS_OWNER_CURRENCY_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS accounts_owner_currency_idx
    ON accounts (owner, currency) WHERE deleted_at IS NULL
"#;

pub const CREATE_ENTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id         BIGSERIAL   PRIMARY KEY,
    account_id BIGINT      NOT NULL REFERENCES accounts (id),
    amount     BIGINT      NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
)
"#;

pub const CREATE_ENTRIES_ACCOUNT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS entries_account_id_idx ON entries (account_id)";

pub const CREATE_TRANSFERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS transfers (
    id              BIGSERIAL   PRIMARY KEY,
    from_account_id BIGINT      NOT NULL
        CONSTRAINT transfers_from_account_id_fkey REFERENCES accounts (id),
    to_account_id   BIGINT      NOT NULL
        CONSTRAINT transfers_to_account_id_fkey REFERENCES accounts (id),
    amount          BIGINT      NOT NULL CHECK (amount > 0),
    created_at      TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    CHECK (from_account_id <> to_account_id)
)
"#;

pub const CREATE_TRANSFERS_FROM_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS transfers_from_account_id_idx ON transfers (from_account_id)";

pub const CREATE_TRANSFERS_TO_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS transfers_to_account_id_idx ON transfers (to_account_id)";

const STATEMENTS: &[(&str, &str)] = &[
    ("users", CREATE_USERS_TABLE),
    ("accounts", CREATE_ACCOUNTS_TABLE),
    ("accounts_owner_currency_idx", CREATE_ACCOUNTS_OWNER_CURRENCY_INDEX),
    ("entries", CREATE_ENTRIES_TABLE),
    ("entries_account_id_idx", CREATE_ENTRIES_ACCOUNT_INDEX),
    ("transfers", CREATE_TRANSFERS_TABLE),
    ("transfers_from_account_id_idx", CREATE_TRANSFERS_FROM_INDEX),
    ("transfers_to_account_id_idx", CREATE_TRANSFERS_TO_INDEX),
];

/// Create every ledger table and index that does not exist yet
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    tracing::info!("Initializing ledger schema...");

    for (name, ddl) in STATEMENTS {
        sqlx::query(ddl)
            .execute(pool)
            .await
            .with_context(|| format!("Failed to create {}", name))?;
    }

    tracing::info!("Ledger schema initialized successfully");
    Ok(())
}
