//! Ledger persistence
//!
//! Accounts, entries and transfers, plus the transaction primitives the
//! transfer engine is built from. Two stores implement the same contract:
//! - [`PgLedgerStore`] - PostgreSQL via sqlx
//! - [`MemoryLedgerStore`] - in-process, used by tests and `--memory` mode

pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;

pub use error::LedgerError;
pub use memory::MemoryLedgerStore;
pub use models::{
    Account, AccountId, Entry, NewAccount, NewEntry, NewTransfer, Transfer, TransferResult,
};
pub use postgres::PgLedgerStore;
pub use store::{LedgerStore, LedgerTx, run_in_transaction};
