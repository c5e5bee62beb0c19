pub mod account;
pub mod health;
pub mod transfer;

pub use account::{create_account, get_account, list_accounts, list_entries};
pub use health::{HealthResponse, health_check};
pub use transfer::{create_transfer, list_transfers};
