//! Account management
//!
//! - [`validation`] - `CurrencyCode`
//! - [`service`] - open / get / list accounts of an owner

pub mod service;
pub mod validation;

pub use service::{AccountError, AccountService, CreateAccountRequest, DEFAULT_CURRENCIES};
pub use validation::{CurrencyCode, ValidationError};
