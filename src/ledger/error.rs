use thiserror::Error;

use super::models::{AccountId, NewTransfer};

/// Postgres SQLSTATE codes the store translates into domain errors
pub(crate) mod sqlstate {
    pub const UNIQUE_VIOLATION: &str = "23505";
    pub const FOREIGN_KEY_VIOLATION: &str = "23503";
    pub const CHECK_VIOLATION: &str = "23514";
    pub const NUMERIC_OUT_OF_RANGE: &str = "22003";
}

/// Named constraints, see `db::schema`
pub(crate) mod constraint {
    pub const TRANSFERS_FROM_ACCOUNT_FK: &str = "transfers_from_account_id_fkey";
    pub const TRANSFERS_TO_ACCOUNT_FK: &str = "transfers_to_account_id_fkey";
}

/// Ledger store errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Account already exists for owner '{owner}' in {currency}")]
    AccountExists { owner: String, currency: String },

    #[error("Balance of account {0} would become negative")]
    NegativeBalance(AccountId),

    #[error("Balance of account {0} would overflow")]
    BalanceOverflow(AccountId),

    #[error("Transfer not found: {0}")]
    TransferNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl LedgerError {
    /// SQLSTATE of the underlying database error, if any
    pub(crate) fn sqlstate(err: &sqlx::Error) -> Option<String> {
        match err {
            sqlx::Error::Database(db) => db.code().map(|c| c.into_owned()),
            _ => None,
        }
    }

    /// Name of the violated constraint, if any
    pub(crate) fn constraint(err: &sqlx::Error) -> Option<String> {
        match err {
            sqlx::Error::Database(db) => db.constraint().map(str::to_string),
            _ => None,
        }
    }

    /// Translate a failed transfer insert; a foreign key names the missing side
    pub(crate) fn from_transfer_insert(transfer: &NewTransfer, err: sqlx::Error) -> Self {
        match Self::sqlstate(&err).as_deref() {
            Some(sqlstate::FOREIGN_KEY_VIOLATION) => Self::AccountNotFound(
                missing_transfer_account(transfer, Self::constraint(&err).as_deref()),
            ),
            _ => Self::Database(err),
        }
    }

    /// Translate a failed balance update into a domain error where possible
    pub(crate) fn from_balance_update(account_id: AccountId, err: sqlx::Error) -> Self {
        match Self::sqlstate(&err).as_deref() {
            Some(sqlstate::CHECK_VIOLATION) => Self::NegativeBalance(account_id),
            Some(sqlstate::NUMERIC_OUT_OF_RANGE) => Self::BalanceOverflow(account_id),
            _ => Self::Database(err),
        }
    }
}

/// Account a transfer's foreign-key violation points at
fn missing_transfer_account(transfer: &NewTransfer, constraint: Option<&str>) -> AccountId {
    match constraint {
        Some(constraint::TRANSFERS_TO_ACCOUNT_FK) => transfer.to_account_id,
        _ => transfer.from_account_id,
    }
}
