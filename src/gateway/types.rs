//! API Response types and the error -> HTTP mapping
//!
//! - `ApiResponse<T>`: Unified response wrapper
//! - `ApiError`: any service error, rendered as `ApiResponse<()>` with the
//!   status from `ErrorKind::http_status`

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::account::AccountError;
use crate::error::ErrorKind;
use crate::transfer::TransferError;
use crate::user_auth::AuthError;

/// Unified API response wrapper
///
/// All API responses follow this structure:
/// - code: 0 = success, non-zero = error code
/// - msg: short message description
/// - data: actual data (success) or absent (error)
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response code: 0 for success, non-zero for errors
    #[schema(example = 0)]
    pub code: i32,
    /// Response message
    #[schema(example = "ok")]
    pub msg: String,
    /// Response data (only present when code == 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Create success response
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "ok".to_string(),
            data: Some(data),
        }
    }

    /// Create error response
    pub fn error(code: i32, msg: impl Into<String>) -> ApiResponse<()> {
        ApiResponse {
            code,
            msg: msg.into(),
            data: None,
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

/// 200 + `ApiResponse::success`
pub fn ok<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

/// 201 + `ApiResponse::success`
pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (StatusCode::CREATED, Json(ApiResponse::success(data)))
}

/// Error leaving a handler
#[derive(Debug)]
pub struct ApiError {
    pub kind: ErrorKind,
    pub msg: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            msg: msg.into(),
        }
    }

    /// Server-side failures are logged in full and reported generically
    fn from_error(kind: ErrorKind, err: &dyn std::error::Error) -> Self {
        match kind {
            ErrorKind::Storage | ErrorKind::Internal => {
                tracing::error!(code = kind.name(), error = %err, "Request failed");
                Self::new(kind, "Internal server error")
            }
            _ => Self::new(kind, err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()>::error(self.kind.code(), self.msg);
        (self.kind.http_status(), Json(body)).into_response()
    }
}

impl From<TransferError> for ApiError {
    fn from(err: TransferError) -> Self {
        Self::from_error(err.kind(), &err)
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        Self::from_error(err.kind(), &err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        Self::from_error(err.kind(), &err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;

    #[test]
    fn test_success_shape() {
        let json = serde_json::to_value(ApiResponse::success(7)).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["msg"], "ok");
        assert_eq!(json["data"], 7);
    }

    #[test]
    fn test_error_has_no_data() {
        let json = serde_json::to_value(ApiResponse::<()>::error(1002, "nope")).unwrap();
        assert_eq!(json["code"], 1002);
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_transfer_error_status() {
        let resp = ApiError::from(TransferError::InsufficientBalance { account_id: 1 }).into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let resp = ApiError::from(TransferError::AccountNotFound(9)).into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let resp = ApiError::from(TransferError::Unauthorized(9)).into_response();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_storage_error_is_not_leaked() {
        let err = ApiError::from(TransferError::Storage(LedgerError::Database(
            sqlx::Error::PoolTimedOut,
        )));
        assert_eq!(err.kind, ErrorKind::Storage);
        assert_eq!(err.msg, "Internal server error");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_auth_error_status() {
        let resp = ApiError::from(AuthError::UserExists).into_response();
        assert_eq!(resp.status(), StatusCode::CONFLICT);

        let resp = ApiError::from(AuthError::InvalidToken).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
