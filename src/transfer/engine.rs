//! Transfer Engine
//!
//! Moves funds between two accounts as one all-or-nothing unit:
//!
//! ```text
//! BEGIN
//!   verify from, to exist            (ascending id; FOR UPDATE if lock_rows)
//!   INSERT transfer
//!   INSERT entry(from, -amount)
//!   INSERT entry(to,   +amount)
//!   UPDATE balance += delta          (lower account id first)
//!   from.balance < 0 ?  -> InsufficientBalance
//! COMMIT
//! ```
//!
//! # Lock ordering
//!
//! The balance update takes the row lock and keeps it until commit. Every
//! transfer touching the same pair of accounts locks the lower id first, so
//! A->B and B->A running together can never wait on each other in a cycle.
//!
//! The engine itself holds no locks and never retries.

use std::sync::Arc;
use std::time::Duration;

use crate::ledger::{
    AccountId, LedgerStore, LedgerTx, NewEntry, NewTransfer, TransferResult, run_in_transaction,
};

use super::error::TransferError;

/// Engine tunables
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// Upper bound on the writes of one transfer, excluding COMMIT;
    /// `None` waits forever
    pub tx_timeout: Option<Duration>,
    /// Take both row locks with `SELECT ... FOR UPDATE` before any write
    pub lock_rows: bool,
}

pub struct TransferEngine {
    store: Arc<dyn LedgerStore>,
    config: EngineConfig,
}

impl TransferEngine {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    pub fn with_config(store: Arc<dyn LedgerStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    /// Execute one transfer
    ///
    /// On any error nothing is written. Dropping the returned future before
    /// it resolves rolls the open transaction back.
    pub async fn execute_transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: i64,
    ) -> Result<TransferResult, TransferError> {
        if from == to {
            return Err(TransferError::SameAccount);
        }
        if amount <= 0 {
            return Err(TransferError::InvalidAmount);
        }

        let EngineConfig {
            tx_timeout,
            lock_rows,
        } = self.config;

        // Deadline covers the work before COMMIT; a started COMMIT is always awaited
        let result = run_in_transaction(self.store.as_ref(), move |tx| {
            Box::pin(async move {
                let work = Self::exec_transfer(tx, from, to, amount, lock_rows);
                match tx_timeout {
                    Some(limit) => match tokio::time::timeout(limit, work).await {
                        Ok(res) => res,
                        Err(_) => Err(TransferError::Timeout),
                    },
                    None => work.await,
                }
            })
        })
        .await;

        match &result {
            Ok(done) => tracing::info!(
                transfer_id = done.transfer.id,
                from,
                to,
                amount,
                from_balance = done.from_account.balance,
                to_balance = done.to_account.balance,
                "Transfer committed"
            ),
            Err(e) => tracing::warn!(
                from,
                to,
                amount,
                code = e.code(),
                error = %e,
                "Transfer rolled back"
            ),
        }

        result
    }

    async fn exec_transfer(
        tx: &mut dyn LedgerTx,
        from: AccountId,
        to: AccountId,
        amount: i64,
        lock_rows: bool,
    ) -> Result<TransferResult, TransferError> {
        let (first, second) = if from < to { (from, to) } else { (to, from) };

        for id in [first, second] {
            if lock_rows {
                tx.lock_account(id).await?;
            } else {
                tx.get_account(id).await?;
            }
        }

        let transfer = tx
            .create_transfer(NewTransfer {
                from_account_id: from,
                to_account_id: to,
                amount,
            })
            .await?;

        let from_entry = tx
            .create_entry(NewEntry {
                account_id: from,
                amount: -amount,
            })
            .await?;
        let to_entry = tx
            .create_entry(NewEntry {
                account_id: to,
                amount,
            })
            .await?;

        // Lower id first
        let (from_account, to_account) = if from < to {
            let debited = tx.update_balance(from, -amount).await?;
            let credited = tx.update_balance(to, amount).await?;
            (debited, credited)
        } else {
            let credited = tx.update_balance(to, amount).await?;
            let debited = tx.update_balance(from, -amount).await?;
            (debited, credited)
        };

        if from_account.balance < 0 {
            return Err(TransferError::InsufficientBalance { account_id: from });
        }

        Ok(TransferResult {
            transfer,
            from_account,
            to_account,
            from_entry,
            to_entry,
        })
    }
}
