//! Transfer Error Types

use thiserror::Error;

use crate::error::ErrorKind;
use crate::ledger::{AccountId, LedgerError};

/// Errors from the transfer engine and the transfer service boundary
#[derive(Error, Debug)]
pub enum TransferError {
    // === Validation Errors ===
    #[error("Source and target account cannot be the same")]
    SameAccount,

    #[error("Amount must be greater than zero")]
    InvalidAmount,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Account {account_id} currency mismatch: {found} vs {expected}")]
    CurrencyMismatch {
        account_id: AccountId,
        expected: String,
        found: String,
    },

    // === Account Errors ===
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Account {0} does not belong to the caller")]
    Unauthorized(AccountId),

    #[error("Insufficient balance in account {account_id}")]
    InsufficientBalance { account_id: AccountId },

    #[error("Transfer not found: {0}")]
    TransferNotFound(i64),

    // === System Errors ===
    #[error("Transaction timed out")]
    Timeout,

    #[error("Storage error: {0}")]
    Storage(#[source] LedgerError),
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::SameAccount => ErrorKind::SameAccount,
            TransferError::InvalidAmount => ErrorKind::InvalidAmount,
            TransferError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            TransferError::CurrencyMismatch { .. } => ErrorKind::CurrencyMismatch,
            TransferError::AccountNotFound(_) => ErrorKind::AccountNotFound,
            TransferError::Unauthorized(_) => ErrorKind::Unauthorized,
            TransferError::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            TransferError::TransferNotFound(_) => ErrorKind::TransferNotFound,
            TransferError::Timeout => ErrorKind::Timeout,
            TransferError::Storage(_) => ErrorKind::Storage,
        }
    }

    /// Get the error code for API responses
    pub fn code(&self) -> &'static str {
        self.kind().name()
    }
}

impl From<LedgerError> for TransferError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(id) => TransferError::AccountNotFound(id),
            // CHECK (balance >= 0) fired on the debit
            LedgerError::NegativeBalance(id) => TransferError::InsufficientBalance { account_id: id },
            LedgerError::BalanceOverflow(_) => TransferError::InvalidAmount,
            LedgerError::TransferNotFound(id) => TransferError::TransferNotFound(id),
            other => TransferError::Storage(other),
        }
    }
}
