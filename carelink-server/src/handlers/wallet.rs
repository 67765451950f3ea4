use axum::{extract::State, Json};
use benefit_engine::LedgerEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::CustomerIdentity;
use crate::error::{api_success, api_success_with_total, ApiError, ApiResponse};
use crate::server::CarelinkServer;
use crate::validation::RequestValidation;

/// Entries shown on the wallet screen.
const RECENT_ENTRY_LIMIT: i64 = 4;

#[derive(Debug, Serialize, ToSchema)]
pub struct WalletBalanceResponse {
    pub balance: Decimal,
}

/// Top-Up confirmation payload: the gateway reference handed back to the
/// frontend after checkout.
#[derive(Debug, Deserialize, ToSchema)]
pub struct TopUpRequest {
    pub reference: String,
}

impl RequestValidation for TopUpRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.reference, "Missing reference");
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TopUpResponse {
    pub new_balance: Decimal,
}

/// Get the caller's wallet balance
#[utoipa::path(
    get,
    path = "/api/v1/wallet/balance",
    responses(
        (status = 200, description = "Wallet balance", body = WalletBalanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "wallet",
    security(("bearer_auth" = []))
)]
pub async fn get_balance(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
) -> Result<Json<ApiResponse<WalletBalanceResponse>>, ApiError> {
    let balance = server.balance.wallet_balance(&identity.email).await?;
    Ok(Json(api_success(WalletBalanceResponse { balance })))
}

/// List the caller's most recent ledger entries
#[utoipa::path(
    get,
    path = "/api/v1/wallet/transactions",
    responses(
        (status = 200, description = "Recent ledger entries", body = Vec<LedgerEntry>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "wallet",
    security(("bearer_auth" = []))
)]
pub async fn list_transactions(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
) -> Result<Json<ApiResponse<Vec<LedgerEntry>>>, ApiError> {
    let entries = server
        .balance
        .recent_entries(&identity.email, RECENT_ENTRY_LIMIT)
        .await?;
    let total = entries.len() as i64;
    Ok(Json(api_success_with_total(entries, total)))
}

/// Confirm a wallet top-up against the payment gateway
#[utoipa::path(
    post,
    path = "/api/v1/wallet/top-up",
    request_body = TopUpRequest,
    responses(
        (status = 200, description = "Top-up credited", body = TopUpResponse),
        (status = 400, description = "Payment verification failed"),
        (status = 409, description = "Reference already applied"),
        (status = 401, description = "Unauthorized"),
        (status = 502, description = "Payment gateway unreachable"),
        (status = 500, description = "Internal server error")
    ),
    tag = "wallet",
    security(("bearer_auth" = []))
)]
pub async fn top_up(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
    Json(request): Json<TopUpRequest>,
) -> Result<Json<ApiResponse<TopUpResponse>>, ApiError> {
    request.validate()?;

    let new_balance = server
        .wallet
        .confirm_top_up(&identity.as_customer(), &request.reference)
        .await?;
    Ok(Json(api_success(TopUpResponse { new_balance })))
}
