//! Stable error kinds shared by every service layer
//!
//! Each module keeps its own `thiserror` enum; all of them collapse onto one
//! `ErrorKind` so the HTTP boundary can map failures without knowing which
//! layer produced them.

use axum::http::StatusCode;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidParameter,
    InvalidAmount,
    SameAccount,
    CurrencyMismatch,
    InsufficientBalance,
    AccountNotFound,
    TransferNotFound,
    AccountExists,
    UserExists,
    Unauthenticated,
    Unauthorized,
    Timeout,
    #[serde(rename = "STORAGE_ERROR")]
    Storage,
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::InvalidParameter => "INVALID_PARAMETER",
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::SameAccount => "SAME_ACCOUNT",
            Self::CurrencyMismatch => "CURRENCY_MISMATCH",
            Self::InsufficientBalance => "INSUFFICIENT_BALANCE",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",
            Self::TransferNotFound => "TRANSFER_NOT_FOUND",
            Self::AccountExists => "ACCOUNT_EXISTS",
            Self::UserExists => "USER_EXISTS",
            Self::Unauthenticated => "UNAUTHENTICATED",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Timeout => "TIMEOUT",
            Self::Storage => "STORAGE_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// Stable numeric code carried in `ApiResponse.code`
    ///
    /// - 1xxx: request rejected by validation or business rules
    /// - 2xxx: identity
    /// - 4xxx: missing / conflicting resources
    /// - 5xxx: server side
    pub fn code(self) -> i32 {
        match self {
            Self::InvalidParameter => 1001,
            Self::InsufficientBalance => 1002,
            Self::InvalidAmount => 1003,
            Self::SameAccount => 1004,
            Self::CurrencyMismatch => 1005,
            Self::Unauthenticated => 2001,
            Self::Unauthorized => 2003,
            Self::AccountNotFound => 4001,
            Self::TransferNotFound => 4002,
            Self::AccountExists => 4091,
            Self::UserExists => 4092,
            Self::Internal => 5000,
            Self::Storage => 5002,
            Self::Timeout => 5003,
        }
    }

    pub fn http_status(self) -> StatusCode {
        match self {
            Self::InvalidParameter | Self::InvalidAmount => StatusCode::BAD_REQUEST,
            Self::SameAccount | Self::CurrencyMismatch | Self::InsufficientBalance => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Unauthorized => StatusCode::FORBIDDEN,
            Self::AccountNotFound | Self::TransferNotFound => StatusCode::NOT_FOUND,
            Self::AccountExists | Self::UserExists => StatusCode::CONFLICT,
            Self::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            Self::Storage | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
