//! Account handlers (JWT required)

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, created, ok};
use crate::account::CreateAccountRequest;
use crate::ledger::{Account, AccountId, Entry};
use crate::user_auth::Claims;

/// Open an account for the caller
///
/// POST /api/v1/accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account opened", body = ApiResponse<Account>),
        (status = 400, description = "Invalid or unsupported currency"),
        (status = 401, description = "Missing or invalid token"),
        (status = 409, description = "Caller already has an account in this currency")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateAccountRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Account>>)> {
    let account = state
        .accounts
        .create_account(&claims.sub, &req.currency)
        .await?;
    Ok(created(account))
}

/// List the caller's accounts
///
/// GET /api/v1/accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "Accounts, newest first", body = ApiResponse<Vec<Account>>),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn list_accounts(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vec<Account>>>)> {
    let accounts = state.accounts.list_accounts(&claims.sub).await?;
    Ok(ok(accounts))
}

/// Get one of the caller's accounts
///
/// GET /api/v1/accounts/{id}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Account", body = ApiResponse<Account>),
        (status = 403, description = "Account belongs to someone else"),
        (status = 404, description = "No such account")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<AccountId>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Account>>)> {
    let account = state.accounts.get_account(&claims.sub, id).await?;
    Ok(ok(account))
}

/// Ledger entries of one of the caller's accounts
///
/// GET /api/v1/accounts/{id}/entries
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}/entries",
    params(("id" = i64, Path, description = "Account id")),
    responses(
        (status = 200, description = "Entries, newest first", body = ApiResponse<Vec<Entry>>),
        (status = 403, description = "Account belongs to someone else"),
        (status = 404, description = "No such account")
    ),
    security(("bearer_auth" = [])),
    tag = "Account"
)]
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<AccountId>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vec<Entry>>>)> {
    let entries = state.transfers.list_entries(&claims.sub, id).await?;
    Ok(ok(entries))
}
