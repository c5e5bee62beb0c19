//! In-memory ledger store
//!
//! Mirrors the Postgres store's isolation closely enough for the transfer
//! engine to behave identically:
//! - the first balance write in a transaction takes that account's row lock
//!   and holds it until commit or rollback
//! - plain reads never block and see committed state (or the transaction's
//!   own pending writes)
//! - nothing becomes visible to other transactions before commit
//!
//! There is no `CHECK (balance >= 0)` here; negative intermediate balances
//! are left for the engine to catch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use tokio::sync::{Mutex as RowLock, OwnedMutexGuard};

use super::error::LedgerError;
use super::models::{Account, AccountId, Entry, NewAccount, NewEntry, NewTransfer, Transfer};
use super::store::{LedgerStore, LedgerTx};

#[derive(Default)]
struct MemoryState {
    accounts: DashMap<AccountId, Account>,
    row_locks: DashMap<AccountId, Arc<RowLock<()>>>,
    owner_index: DashMap<(String, String), AccountId>,
    entries: Mutex<Vec<Entry>>,
    transfers: Mutex<Vec<Transfer>>,
    account_seq: AtomicI64,
    entry_seq: AtomicI64,
    transfer_seq: AtomicI64,
}

impl MemoryState {
    fn next(seq: &AtomicI64) -> i64 {
        seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn committed(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.accounts
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(LedgerError::AccountNotFound(id))
    }
}

/// Ledger store held entirely in process memory
#[derive(Clone, Default)]
pub struct MemoryLedgerStore {
    state: Arc<MemoryState>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed transfer rows
    pub fn transfer_count(&self) -> usize {
        self.state
            .transfers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Number of committed entry rows
    pub fn entry_count(&self) -> usize {
        self.state
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Open in-memory transaction
pub struct MemoryLedgerTx {
    state: Arc<MemoryState>,
    held: HashMap<AccountId, OwnedMutexGuard<()>>,
    pending: HashMap<AccountId, Account>,
    transfers: Vec<Transfer>,
    entries: Vec<Entry>,
}

impl MemoryLedgerTx {
    /// Take the row lock for `id` (once per transaction) and stage its row
    async fn acquire(&mut self, id: AccountId) -> Result<(), LedgerError> {
        if self.held.contains_key(&id) {
            return Ok(());
        }

        let lock = self
            .state
            .row_locks
            .get(&id)
            .map(|r| Arc::clone(r.value()))
            .ok_or(LedgerError::AccountNotFound(id))?;
        let guard = lock.lock_owned().await;

        // Only the lock holder commits this row, so it cannot move under us now
        let row = self.state.committed(id)?;
        self.pending.insert(id, row);
        self.held.insert(id, guard);
        Ok(())
    }

    fn visible(&self, id: AccountId) -> Result<Account, LedgerError> {
        match self.pending.get(&id) {
            Some(row) => Ok(row.clone()),
            None => self.state.committed(id),
        }
    }
}

#[async_trait]
impl LedgerTx for MemoryLedgerTx {
    async fn get_account(&mut self, id: AccountId) -> Result<Account, LedgerError> {
        self.visible(id)
    }

    async fn lock_account(&mut self, id: AccountId) -> Result<Account, LedgerError> {
        self.acquire(id).await?;
        self.visible(id)
    }

    async fn update_balance(&mut self, id: AccountId, delta: i64) -> Result<Account, LedgerError> {
        self.acquire(id).await?;

        let row = self
            .pending
            .get_mut(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        row.balance = row
            .balance
            .checked_add(delta)
            .ok_or(LedgerError::BalanceOverflow(id))?;
        Ok(row.clone())
    }

    async fn create_transfer(&mut self, transfer: NewTransfer) -> Result<Transfer, LedgerError> {
        for id in [transfer.from_account_id, transfer.to_account_id] {
            if !self.state.accounts.contains_key(&id) {
                return Err(LedgerError::AccountNotFound(id));
            }
        }

        let row = Transfer {
            id: MemoryState::next(&self.state.transfer_seq),
            from_account_id: transfer.from_account_id,
            to_account_id: transfer.to_account_id,
            amount: transfer.amount,
            created_at: Utc::now(),
        };
        self.transfers.push(row.clone());
        Ok(row)
    }

    async fn create_entry(&mut self, entry: NewEntry) -> Result<Entry, LedgerError> {
        if !self.state.accounts.contains_key(&entry.account_id) {
            return Err(LedgerError::AccountNotFound(entry.account_id));
        }

        let row = Entry {
            id: MemoryState::next(&self.state.entry_seq),
            account_id: entry.account_id,
            amount: entry.amount,
            created_at: Utc::now(),
        };
        self.entries.push(row.clone());
        Ok(row)
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        let MemoryLedgerTx {
            state,
            held,
            pending,
            transfers,
            entries,
        } = *self;

        state
            .transfers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(transfers);
        state
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(entries);
        for (id, row) in pending {
            state.accounts.insert(id, row);
        }

        // Row locks are released last
        drop(held);
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), LedgerError> {
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    fn name(&self) -> &'static str {
        "Memory"
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTx>, LedgerError> {
        Ok(Box::new(MemoryLedgerTx {
            state: Arc::clone(&self.state),
            held: HashMap::new(),
            pending: HashMap::new(),
            transfers: Vec::new(),
            entries: Vec::new(),
        }))
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, LedgerError> {
        if account.opening_balance < 0 {
            return Err(LedgerError::NegativeBalance(0));
        }

        let key = (account.owner.clone(), account.currency.clone());
        match self.state.owner_index.entry(key) {
            MapEntry::Occupied(_) => Err(LedgerError::AccountExists {
                owner: account.owner,
                currency: account.currency,
            }),
            MapEntry::Vacant(slot) => {
                let now = Utc::now();
                let row = Account {
                    id: MemoryState::next(&self.state.account_seq),
                    owner: account.owner,
                    balance: account.opening_balance,
                    currency: account.currency,
                    created_at: now,
                };

                if account.opening_balance != 0 {
                    let opening = Entry {
                        id: MemoryState::next(&self.state.entry_seq),
                        account_id: row.id,
                        amount: account.opening_balance,
                        created_at: now,
                    };
                    self.state
                        .entries
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .push(opening);
                }

                self.state
                    .row_locks
                    .insert(row.id, Arc::new(RowLock::new(())));
                self.state.accounts.insert(row.id, row.clone());
                slot.insert(row.id);
                Ok(row)
            }
        }
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        self.state.committed(id)
    }

    async fn find_account(
        &self,
        owner: &str,
        currency: &str,
    ) -> Result<Option<Account>, LedgerError> {
        let id = self
            .state
            .owner_index
            .get(&(owner.to_string(), currency.to_string()))
            .map(|r| *r.value());
        match id {
            Some(id) => Ok(Some(self.state.committed(id)?)),
            None => Ok(None),
        }
    }

    async fn list_accounts(&self, owner: &str) -> Result<Vec<Account>, LedgerError> {
        let mut rows: Vec<Account> = self
            .state
            .accounts
            .iter()
            .filter(|r| r.value().owner == owner)
            .map(|r| r.value().clone())
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn list_entries(&self, account_id: AccountId) -> Result<Vec<Entry>, LedgerError> {
        let entries = self
            .state
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<Entry> = entries
            .iter()
            .filter(|e| e.account_id == account_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn list_transfers(&self, account_id: AccountId) -> Result<Vec<Transfer>, LedgerError> {
        let transfers = self
            .state
            .transfers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut rows: Vec<Transfer> = transfers
            .iter()
            .filter(|t| t.from_account_id == account_id || t.to_account_id == account_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows)
    }

    async fn get_transfer(&self, id: i64) -> Result<Transfer, LedgerError> {
        self.state
            .transfers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(LedgerError::TransferNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn test_create_and_find_account() {
        let store = MemoryLedgerStore::new();
        let acc = store
            .create_account(NewAccount::new("alice", "USD"))
            .await
            .unwrap();

        assert_eq!(acc.balance, 0);
        assert_eq!(store.get_account(acc.id).await.unwrap(), acc);
        assert_eq!(
            store.find_account("alice", "USD").await.unwrap(),
            Some(acc.clone())
        );
        assert_eq!(store.find_account("alice", "EUR").await.unwrap(), None);
        assert_eq!(store.entry_count(), 0);
    }

    #[tokio::test]
    async fn test_one_account_per_owner_and_currency() {
        let store = MemoryLedgerStore::new();
        store
            .create_account(NewAccount::new("alice", "USD"))
            .await
            .unwrap();

        let dup = store.create_account(NewAccount::new("alice", "USD")).await;
        assert!(matches!(dup, Err(LedgerError::AccountExists { .. })));

        // Other currency and other owner are fine
        store
            .create_account(NewAccount::new("alice", "EUR"))
            .await
            .unwrap();
        store
            .create_account(NewAccount::new("bob", "USD"))
            .await
            .unwrap();
        assert_eq!(store.list_accounts("alice").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_opening_balance_writes_opening_entry() {
        let store = MemoryLedgerStore::new();
        let acc = store
            .create_account(NewAccount::new("alice", "USD").with_opening_balance(1000))
            .await
            .unwrap();

        let entries = store.list_entries(acc.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].amount, 1000);

        let negative = store
            .create_account(NewAccount::new("bob", "USD").with_opening_balance(-5))
            .await;
        assert!(matches!(negative, Err(LedgerError::NegativeBalance(_))));
    }

    #[tokio::test]
    async fn test_writes_invisible_until_commit() {
        let store = MemoryLedgerStore::new();
        let acc = store
            .create_account(NewAccount::new("alice", "USD"))
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        let updated = tx.update_balance(acc.id, 500).await.unwrap();
        assert_eq!(updated.balance, 500);
        // Own writes are visible inside the transaction
        assert_eq!(tx.get_account(acc.id).await.unwrap().balance, 500);
        // But not outside it
        assert_eq!(store.get_account(acc.id).await.unwrap().balance, 0);

        tx.commit().await.unwrap();
        assert_eq!(store.get_account(acc.id).await.unwrap().balance, 500);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let store = MemoryLedgerStore::new();
        let acc = store
            .create_account(NewAccount::new("alice", "USD"))
            .await
            .unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.update_balance(acc.id, 500).await.unwrap();
            tx.create_entry(NewEntry {
                account_id: acc.id,
                amount: 500,
            })
            .await
            .unwrap();
        }

        assert_eq!(store.get_account(acc.id).await.unwrap().balance, 0);
        assert_eq!(store.entry_count(), 0);

        // The row lock was released with the dropped transaction
        let mut tx = store.begin().await.unwrap();
        let row = tokio::time::timeout(Duration::from_secs(1), tx.update_balance(acc.id, 1))
            .await
            .expect("row lock leaked")
            .unwrap();
        assert_eq!(row.balance, 1);
    }

    #[tokio::test]
    async fn test_row_lock_blocks_second_writer_until_commit() {
        let store = MemoryLedgerStore::new();
        let acc = store
            .create_account(NewAccount::new("alice", "USD").with_opening_balance(100))
            .await
            .unwrap();

        let mut first = store.begin().await.unwrap();
        first.update_balance(acc.id, -60).await.unwrap();

        let second_store = store.clone();
        let id = acc.id;
        let second = tokio::spawn(async move {
            let mut tx = second_store.begin().await.unwrap();
            let row = tx.update_balance(id, -60).await.unwrap();
            tx.rollback().await.unwrap();
            row.balance
        });

        // Second writer is parked on the row lock
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!second.is_finished());

        first.commit().await.unwrap();
        // After the first commit it sees 40 and goes to -20
        assert_eq!(second.await.unwrap(), -20);
        assert_eq!(store.get_account(id).await.unwrap().balance, 40);
    }

    #[tokio::test]
    async fn test_reads_do_not_block_on_locked_rows() {
        let store = MemoryLedgerStore::new();
        let acc = store
            .create_account(NewAccount::new("alice", "USD").with_opening_balance(100))
            .await
            .unwrap();

        let mut writer = store.begin().await.unwrap();
        writer.update_balance(acc.id, -30).await.unwrap();

        let mut reader = store.begin().await.unwrap();
        let seen = tokio::time::timeout(Duration::from_secs(1), reader.get_account(acc.id))
            .await
            .expect("plain read blocked")
            .unwrap();
        assert_eq!(seen.balance, 100);
    }

    #[tokio::test]
    async fn test_overflow_and_missing_rows() {
        let store = MemoryLedgerStore::new();
        let acc = store
            .create_account(NewAccount::new("alice", "USD").with_opening_balance(i64::MAX))
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        let res = tx.update_balance(acc.id, 1).await;
        assert!(matches!(res, Err(LedgerError::BalanceOverflow(_))));

        let res = tx.update_balance(404, 1).await;
        assert!(matches!(res, Err(LedgerError::AccountNotFound(404))));

        let res = tx
            .create_transfer(NewTransfer {
                from_account_id: acc.id,
                to_account_id: 404,
                amount: 1,
            })
            .await;
        assert!(matches!(res, Err(LedgerError::AccountNotFound(404))));
    }

    #[tokio::test]
    async fn test_list_transfers_matches_either_side() {
        let store = MemoryLedgerStore::new();
        let a = store
            .create_account(NewAccount::new("alice", "USD").with_opening_balance(100))
            .await
            .unwrap();
        let b = store
            .create_account(NewAccount::new("bob", "USD"))
            .await
            .unwrap();
        let c = store
            .create_account(NewAccount::new("carol", "USD"))
            .await
            .unwrap();

        let mut tx = store.begin().await.unwrap();
        let t1 = tx
            .create_transfer(NewTransfer {
                from_account_id: a.id,
                to_account_id: b.id,
                amount: 10,
            })
            .await
            .unwrap();
        let t2 = tx
            .create_transfer(NewTransfer {
                from_account_id: b.id,
                to_account_id: c.id,
                amount: 5,
            })
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let for_b = store.list_transfers(b.id).await.unwrap();
        assert_eq!(for_b, vec![t2.clone(), t1.clone()]);
        assert_eq!(store.list_transfers(a.id).await.unwrap(), vec![t1.clone()]);
        assert_eq!(store.get_transfer(t2.id).await.unwrap(), t2);
        assert!(matches!(
            store.get_transfer(999).await,
            Err(LedgerError::TransferNotFound(999))
        ));
    }
}
