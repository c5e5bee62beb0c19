//! Account service: open, fetch and list the caller's accounts
//!
//! Accounts always open at zero over this path. Funds arrive only through
//! transfers (or an opening balance written by seeding code directly
//! against the store).

use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::error::ErrorKind;
use crate::ledger::{Account, AccountId, LedgerError, LedgerStore, NewAccount};

use super::validation::{CurrencyCode, ValidationError};

/// Currencies accepted when no list is configured
pub const DEFAULT_CURRENCIES: &[&str] = &["USD", "EUR", "CNY"];

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("Invalid currency: {0}")]
    InvalidCurrency(#[from] ValidationError),

    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    #[error("Account already exists for '{owner}' in {currency}")]
    AccountExists { owner: String, currency: String },

    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    #[error("Account {0} does not belong to the caller")]
    Unauthorized(AccountId),

    #[error("Storage error: {0}")]
    Storage(#[source] LedgerError),
}

impl AccountError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AccountError::InvalidCurrency(_) | AccountError::UnsupportedCurrency(_) => {
                ErrorKind::InvalidParameter
            }
            AccountError::AccountExists { .. } => ErrorKind::AccountExists,
            AccountError::AccountNotFound(_) => ErrorKind::AccountNotFound,
            AccountError::Unauthorized(_) => ErrorKind::Unauthorized,
            AccountError::Storage(_) => ErrorKind::Storage,
        }
    }
}

impl From<LedgerError> for AccountError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::AccountNotFound(id) => AccountError::AccountNotFound(id),
            LedgerError::AccountExists { owner, currency } => {
                AccountError::AccountExists { owner, currency }
            }
            other => AccountError::Storage(other),
        }
    }
}

/// Open account request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateAccountRequest {
    #[schema(example = "USD")]
    pub currency: String,
}

pub struct AccountService {
    store: Arc<dyn LedgerStore>,
    supported_currencies: Vec<String>,
}

impl AccountService {
    pub fn new(store: Arc<dyn LedgerStore>, supported_currencies: Vec<String>) -> Self {
        let supported_currencies = if supported_currencies.is_empty() {
            DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect()
        } else {
            supported_currencies
        };
        Self {
            store,
            supported_currencies,
        }
    }

    pub fn supported_currencies(&self) -> &[String] {
        &self.supported_currencies
    }

    /// Open a zero-balance account for `owner`
    pub async fn create_account(
        &self,
        owner: &str,
        currency: &str,
    ) -> Result<Account, AccountError> {
        let currency = CurrencyCode::new(currency)?;
        if !self
            .supported_currencies
            .iter()
            .any(|c| c == currency.as_str())
        {
            return Err(AccountError::UnsupportedCurrency(currency.into_string()));
        }

        let account = self
            .store
            .create_account(NewAccount::new(owner, currency.as_str()))
            .await?;
        tracing::info!(
            account_id = account.id,
            owner,
            currency = %account.currency,
            "Account opened"
        );
        Ok(account)
    }

    /// Fetch one account; the caller must own it
    pub async fn get_account(&self, owner: &str, id: AccountId) -> Result<Account, AccountError> {
        let account = self.store.get_account(id).await?;
        if account.owner != owner {
            return Err(AccountError::Unauthorized(id));
        }
        Ok(account)
    }

    /// All of the caller's accounts, newest first
    pub async fn list_accounts(&self, owner: &str) -> Result<Vec<Account>, AccountError> {
        Ok(self.store.list_accounts(owner).await?)
    }
}
