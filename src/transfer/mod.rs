//! Money transfers
//!
//! - [`engine`] - the transactional core (entries, lock ordering, commit/rollback)
//! - [`service`] - ownership, currency and balance checks in front of the engine
//! - [`error`] - `TransferError`
//! - [`types`] - request types

pub mod engine;
pub mod error;
pub mod service;
pub mod types;

pub use engine::{EngineConfig, TransferEngine};
pub use error::TransferError;
pub use service::TransferService;
pub use types::{CreateTransferRequest, ListTransfersQuery};
