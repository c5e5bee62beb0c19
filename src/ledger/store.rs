//! Ledger store contract and the transaction executor
//!
//! `LedgerTx` carries the primitives the transfer engine composes. Every one
//! of them runs inside the caller's transaction; a store never opens its own
//! transaction while a `LedgerTx` is live.

use async_trait::async_trait;
use futures::future::BoxFuture;

use super::error::LedgerError;
use super::models::{Account, AccountId, Entry, NewAccount, NewEntry, NewTransfer, Transfer};

/// One open unit of work against the ledger
///
/// Dropping a `LedgerTx` without calling `commit` discards every write made
/// through it.
#[async_trait]
pub trait LedgerTx: Send {
    /// Point lookup. Does not block on rows locked by other transactions.
    async fn get_account(&mut self, id: AccountId) -> Result<Account, LedgerError>;

    /// Point lookup that also takes the row lock (`SELECT ... FOR UPDATE`)
    async fn lock_account(&mut self, id: AccountId) -> Result<Account, LedgerError>;

    /// `balance = balance + delta` as one atomic statement; returns the row
    /// as it stands after the update.
    async fn update_balance(&mut self, id: AccountId, delta: i64) -> Result<Account, LedgerError>;

    async fn create_transfer(&mut self, transfer: NewTransfer) -> Result<Transfer, LedgerError>;

    async fn create_entry(&mut self, entry: NewEntry) -> Result<Entry, LedgerError>;

    async fn commit(self: Box<Self>) -> Result<(), LedgerError>;

    async fn rollback(self: Box<Self>) -> Result<(), LedgerError>;
}

/// Ledger persistence: transaction factory plus read-side queries
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Get adapter name for logging
    fn name(&self) -> &'static str;

    async fn begin(&self) -> Result<Box<dyn LedgerTx>, LedgerError>;

    /// Insert an account (and its opening entry when funded) atomically
    async fn create_account(&self, account: NewAccount) -> Result<Account, LedgerError>;

    async fn get_account(&self, id: AccountId) -> Result<Account, LedgerError>;

    async fn find_account(
        &self,
        owner: &str,
        currency: &str,
    ) -> Result<Option<Account>, LedgerError>;

    /// Accounts of one owner, newest first
    async fn list_accounts(&self, owner: &str) -> Result<Vec<Account>, LedgerError>;

    /// Entries of one account, newest first
    async fn list_entries(&self, account_id: AccountId) -> Result<Vec<Entry>, LedgerError>;

    /// Transfers touching one account on either side, newest first
    async fn list_transfers(&self, account_id: AccountId) -> Result<Vec<Transfer>, LedgerError>;

    async fn get_transfer(&self, id: i64) -> Result<Transfer, LedgerError>;
}

/// Run `f` inside one transaction
///
/// Commits iff `f` returns `Ok`. On `Err` the transaction is rolled back and
/// the original error is returned; a failing rollback is logged and never
/// replaces it. If the returned future is dropped mid-flight the open
/// transaction is dropped with it, which rolls it back.
pub async fn run_in_transaction<S, T, E, F>(store: &S, f: F) -> Result<T, E>
where
    S: LedgerStore + ?Sized,
    T: Send,
    E: From<LedgerError> + std::fmt::Display + Send,
    F: for<'t> FnOnce(&'t mut dyn LedgerTx) -> BoxFuture<'t, Result<T, E>> + Send,
{
    let mut tx = store.begin().await?;

    match f(tx.as_mut()).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(
                    store = store.name(),
                    error = %rollback_err,
                    original = %err,
                    "Rollback failed"
                );
            }
            Err(err)
        }
    }
}
