//! PostgreSQL ledger store
//!
//! Balance changes are single `UPDATE ... SET balance = balance + $delta`
//! statements. The row lock that statement takes is held until the
//! surrounding transaction ends, which serializes concurrent writers of the
//! same account without any application-side locking.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::error::{LedgerError, sqlstate};
use super::models::{Account, AccountId, Entry, NewAccount, NewEntry, NewTransfer, Transfer};
use super::store::{LedgerStore, LedgerTx};

const ACCOUNT_COLUMNS: &str = "id, owner, balance, currency, created_at";

/// Ledger store backed by a Postgres pool
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Open Postgres transaction
///
/// `sqlx::Transaction` rolls back on drop, so an abandoned `PgLedgerTx`
/// never commits.
pub struct PgLedgerTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl LedgerTx for PgLedgerTx {
    async fn get_account(&mut self, id: AccountId) -> Result<Account, LedgerError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))
    }

    async fn lock_account(&mut self, id: AccountId) -> Result<Account, LedgerError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND deleted_at IS NULL FOR UPDATE"
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))
    }

    async fn update_balance(&mut self, id: AccountId, delta: i64) -> Result<Account, LedgerError> {
        let sql = format!(
            "UPDATE accounts SET balance = balance + $2, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {ACCOUNT_COLUMNS}"
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .bind(delta)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(|e| LedgerError::from_balance_update(id, e))?
            .ok_or(LedgerError::AccountNotFound(id))
    }

    async fn create_transfer(&mut self, transfer: NewTransfer) -> Result<Transfer, LedgerError> {
        sqlx::query_as::<_, Transfer>(
            r#"INSERT INTO transfers (from_account_id, to_account_id, amount)
               VALUES ($1, $2, $3)
               RETURNING id, from_account_id, to_account_id, amount, created_at"#,
        )
        .bind(transfer.from_account_id)
        .bind(transfer.to_account_id)
        .bind(transfer.amount)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| LedgerError::from_transfer_insert(&transfer, e))
    }

    async fn create_entry(&mut self, entry: NewEntry) -> Result<Entry, LedgerError> {
        sqlx::query_as::<_, Entry>(
            r#"INSERT INTO entries (account_id, amount)
               VALUES ($1, $2)
               RETURNING id, account_id, amount, created_at"#,
        )
        .bind(entry.account_id)
        .bind(entry.amount)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| match LedgerError::sqlstate(&e).as_deref() {
            Some(sqlstate::FOREIGN_KEY_VIOLATION) => LedgerError::AccountNotFound(entry.account_id),
            _ => LedgerError::Database(e),
        })
    }

    async fn commit(self: Box<Self>) -> Result<(), LedgerError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), LedgerError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    fn name(&self) -> &'static str {
        "Postgres"
    }

    async fn begin(&self) -> Result<Box<dyn LedgerTx>, LedgerError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgLedgerTx { tx }))
    }

    async fn create_account(&self, account: NewAccount) -> Result<Account, LedgerError> {
        if account.opening_balance < 0 {
            return Err(LedgerError::NegativeBalance(0));
        }

        let mut tx = self.pool.begin().await?;

        let sql = format!(
            "INSERT INTO accounts (owner, currency, balance) VALUES ($1, $2, $3)
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Account>(&sql)
            .bind(&account.owner)
            .bind(&account.currency)
            .bind(account.opening_balance)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| match LedgerError::sqlstate(&e).as_deref() {
                Some(sqlstate::UNIQUE_VIOLATION) => LedgerError::AccountExists {
                    owner: account.owner.clone(),
                    currency: account.currency.clone(),
                },
                _ => LedgerError::Database(e),
            })?;

        if account.opening_balance != 0 {
            sqlx::query("INSERT INTO entries (account_id, amount) VALUES ($1, $2)")
                .bind(created.id)
                .bind(account.opening_balance)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn get_account(&self, id: AccountId) -> Result<Account, LedgerError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND deleted_at IS NULL"
        );
        sqlx::query_as::<_, Account>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(LedgerError::AccountNotFound(id))
    }

    async fn find_account(
        &self,
        owner: &str,
        currency: &str,
    ) -> Result<Option<Account>, LedgerError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts
             WHERE owner = $1 AND currency = $2 AND deleted_at IS NULL"
        );
        let row = sqlx::query_as::<_, Account>(&sql)
            .bind(owner)
            .bind(currency)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_accounts(&self, owner: &str) -> Result<Vec<Account>, LedgerError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts
             WHERE owner = $1 AND deleted_at IS NULL ORDER BY id DESC"
        );
        let rows = sqlx::query_as::<_, Account>(&sql)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn list_entries(&self, account_id: AccountId) -> Result<Vec<Entry>, LedgerError> {
        let rows = sqlx::query_as::<_, Entry>(
            r#"SELECT id, account_id, amount, created_at FROM entries
               WHERE account_id = $1 ORDER BY id DESC"#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn list_transfers(&self, account_id: AccountId) -> Result<Vec<Transfer>, LedgerError> {
        let rows = sqlx::query_as::<_, Transfer>(
            r#"SELECT id, from_account_id, to_account_id, amount, created_at FROM transfers
               WHERE from_account_id = $1 OR to_account_id = $1 ORDER BY id DESC"#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get_transfer(&self, id: i64) -> Result<Transfer, LedgerError> {
        sqlx::query_as::<_, Transfer>(
            r#"SELECT id, from_account_id, to_account_id, amount, created_at
               FROM transfers WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(LedgerError::TransferNotFound(id))
    }
}
