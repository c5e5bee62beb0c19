//! Ledger records: accounts, entries and transfers
//!
//! All amounts are `i64` minor currency units (cents). Floating point never
//! touches a balance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Account identifier (BIGSERIAL in Postgres)
pub type AccountId = i64;

/// Bank account
///
/// `balance >= 0` holds after every committed transfer. Accounts are never
/// physically deleted; `deleted_at` marks a soft delete and hides the row
/// from every lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Account {
    pub id: AccountId,
    pub owner: String,
    /// Minor units
    pub balance: i64,
    /// ISO-style 3-letter code
    #[schema(example = "USD")]
    pub currency: String,
    pub created_at: DateTime<Utc>,
}

/// One signed balance movement against a single account
///
/// Positive = credit, negative = debit. Entries are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Entry {
    pub id: i64,
    pub account_id: AccountId,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

impl Entry {
    pub fn is_credit(&self) -> bool {
        self.amount > 0
    }

    pub fn is_debit(&self) -> bool {
        self.amount < 0
    }
}

/// A committed movement of funds between two distinct accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Transfer {
    pub id: i64,
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    /// Always > 0
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for an account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub owner: String,
    pub currency: String,
    /// Opening balance. Non-zero values are mirrored by an opening entry so
    /// the ledger reconciles from the first row.
    pub opening_balance: i64,
}

impl NewAccount {
    pub fn new(owner: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            currency: currency.into(),
            opening_balance: 0,
        }
    }

    pub fn with_opening_balance(mut self, amount: i64) -> Self {
        self.opening_balance = amount;
        self
    }
}

/// Insert payload for a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewTransfer {
    pub from_account_id: AccountId,
    pub to_account_id: AccountId,
    pub amount: i64,
}

/// Insert payload for an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewEntry {
    pub account_id: AccountId,
    pub amount: i64,
}

/// Everything one committed transfer produced
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferResult {
    pub transfer: Transfer,
    pub from_account: Account,
    pub to_account: Account,
    pub from_entry: Entry,
    pub to_entry: Entry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_direction() {
        let credit = Entry {
            id: 1,
            account_id: 7,
            amount: 300,
            created_at: Utc::now(),
        };
        let debit = Entry {
            amount: -300,
            ..credit.clone()
        };

        assert!(credit.is_credit());
        assert!(!credit.is_debit());
        assert!(debit.is_debit());
        assert!(!debit.is_credit());
    }

    #[test]
    fn test_new_account_defaults_to_zero() {
        let acc = NewAccount::new("alice", "USD");
        assert_eq!(acc.opening_balance, 0);

        let funded = NewAccount::new("alice", "USD").with_opening_balance(1000);
        assert_eq!(funded.opening_balance, 1000);
    }
}
