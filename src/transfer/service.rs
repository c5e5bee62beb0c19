//! Transfer service
//!
//! Boundary checks in front of the engine: the caller must own the source
//! account, both accounts must hold the requested currency and the source
//! must cover the amount. The engine re-checks the balance inside the
//! transaction, so a stale read here can only produce a cleaner error, never
//! an overdraft.

use std::sync::Arc;

use crate::account::CurrencyCode;
use crate::ledger::{Account, AccountId, Entry, LedgerStore, Transfer, TransferResult};

use super::engine::TransferEngine;
use super::error::TransferError;
use super::types::CreateTransferRequest;

pub struct TransferService {
    engine: Arc<TransferEngine>,
}

impl TransferService {
    pub fn new(engine: Arc<TransferEngine>) -> Self {
        Self { engine }
    }

    fn store(&self) -> &dyn LedgerStore {
        self.engine.store().as_ref()
    }

    /// Create a transfer on behalf of `owner`
    pub async fn create_transfer(
        &self,
        owner: &str,
        req: CreateTransferRequest,
    ) -> Result<TransferResult, TransferError> {
        if req.from_account_id == req.to_account_id {
            return Err(TransferError::SameAccount);
        }
        if req.amount <= 0 {
            return Err(TransferError::InvalidAmount);
        }
        let currency = CurrencyCode::new(&req.currency)
            .map_err(|e| TransferError::InvalidParameter(e.to_string()))?;

        let from = self.owned_account(owner, req.from_account_id).await?;
        let to = self.store().get_account(req.to_account_id).await?;

        check_currency(&from, &currency)?;
        check_currency(&to, &currency)?;

        if from.balance < req.amount {
            return Err(TransferError::InsufficientBalance {
                account_id: from.id,
            });
        }

        tracing::debug!(
            owner,
            from = from.id,
            to = to.id,
            amount = req.amount,
            currency = %currency,
            "Transfer preconditions passed"
        );

        self.engine
            .execute_transfer(from.id, to.id, req.amount)
            .await
    }

    /// Transfers touching an account the caller owns, newest first
    pub async fn list_transfers(
        &self,
        owner: &str,
        account_id: AccountId,
    ) -> Result<Vec<Transfer>, TransferError> {
        self.owned_account(owner, account_id).await?;
        Ok(self.store().list_transfers(account_id).await?)
    }

    /// Entries of an account the caller owns, newest first
    pub async fn list_entries(
        &self,
        owner: &str,
        account_id: AccountId,
    ) -> Result<Vec<Entry>, TransferError> {
        self.owned_account(owner, account_id).await?;
        Ok(self.store().list_entries(account_id).await?)
    }

    async fn owned_account(&self, owner: &str, id: AccountId) -> Result<Account, TransferError> {
        let account = self.store().get_account(id).await?;
        if account.owner != owner {
            return Err(TransferError::Unauthorized(id));
        }
        Ok(account)
    }
}

fn check_currency(account: &Account, currency: &CurrencyCode) -> Result<(), TransferError> {
    if account.currency != currency.as_str() {
        return Err(TransferError::CurrencyMismatch {
            account_id: account.id,
            expected: currency.to_string(),
            found: account.currency.clone(),
        });
    }
    Ok(())
}
