//! Simple Bank - accounts and double-entry money transfers
//!
//! # Modules
//!
//! - [`ledger`] - Account / entry / transfer records and the stores behind them
//! - [`transfer`] - Transfer engine (the transactional core) and its service
//! - [`account`] - Opening and listing accounts
//! - [`user_auth`] - Users, login and JWT verification
//! - [`gateway`] - HTTP API
//! - [`config`] / [`logging`] / [`db`] - Startup plumbing

pub mod account;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
pub mod ledger;
pub mod logging;
pub mod transfer;
pub mod user_auth;

// Convenient re-exports at crate root
pub use error::ErrorKind;
pub use ledger::{
    Account, AccountId, Entry, LedgerError, LedgerStore, LedgerTx, MemoryLedgerStore,
    PgLedgerStore, Transfer, TransferResult, run_in_transaction,
};
pub use transfer::{EngineConfig, TransferEngine, TransferError, TransferService};
