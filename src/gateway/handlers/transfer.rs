//! Transfer handlers (JWT required)

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};

use super::super::state::AppState;
use super::super::types::{ApiResponse, ApiResult, created, ok};
use crate::ledger::{Transfer, TransferResult};
use crate::transfer::{CreateTransferRequest, ListTransfersQuery};
use crate::user_auth::Claims;

/// Move funds out of one of the caller's accounts
///
/// POST /api/v1/transfers
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer committed", body = ApiResponse<TransferResult>),
        (status = 400, description = "Invalid amount or parameter"),
        (status = 403, description = "Source account belongs to someone else"),
        (status = 404, description = "Account not found"),
        (status = 422, description = "Same account, currency mismatch or insufficient balance"),
        (status = 503, description = "Transaction timed out")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTransferRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<TransferResult>>)> {
    let result = state.transfers.create_transfer(&claims.sub, req).await?;
    Ok(created(result))
}

/// Transfers touching one of the caller's accounts
///
/// GET /api/v1/transfers?account_id={id}
#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    params(ListTransfersQuery),
    responses(
        (status = 200, description = "Transfers, newest first", body = ApiResponse<Vec<Transfer>>),
        (status = 403, description = "Account belongs to someone else"),
        (status = 404, description = "Account not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Transfer"
)]
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ListTransfersQuery>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Vec<Transfer>>>)> {
    let transfers = state
        .transfers
        .list_transfers(&claims.sub, query.account_id)
        .await?;
    Ok(ok(transfers))
}
