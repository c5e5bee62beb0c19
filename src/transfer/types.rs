//! Transfer request/response types

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::ledger::AccountId;

/// Create transfer request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreateTransferRequest {
    #[schema(example = 1)]
    pub from_account_id: AccountId,
    #[schema(example = 2)]
    pub to_account_id: AccountId,
    /// Minor units, must be > 0
    #[schema(example = 300)]
    pub amount: i64,
    /// Both accounts must hold this currency
    #[schema(example = "USD")]
    pub currency: String,
}

/// Query for `GET /api/v1/transfers`
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ListTransfersQuery {
    /// Account on either side of the transfer
    pub account_id: AccountId,
}
