use axum::{extract::State, Json};
use benefit_engine::{Card, EngineError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use crate::auth::CustomerIdentity;
use crate::error::{api_success, ApiError, ApiResponse};
use crate::server::CarelinkServer;

/// Card request payload. `confirm_replace` must be set when the caller
/// already holds a card and wants it reissued.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RequestCardRequest {
    #[serde(default)]
    pub confirm_replace: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CardIssuanceResponse {
    /// Set when an existing card blocks issuance until the caller confirms.
    pub require_confirmation: bool,
    pub card: Card,
}

/// Get the caller's loyalty card
#[utoipa::path(
    get,
    path = "/api/v1/card",
    responses(
        (status = 200, description = "Card retrieved", body = Card),
        (status = 404, description = "No card issued yet"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "card",
    security(("bearer_auth" = []))
)]
pub async fn get_card(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
) -> Result<Json<ApiResponse<Card>>, ApiError> {
    let card = server
        .cards
        .find_for_account(identity.account_id)
        .await?
        .ok_or_else(|| ApiError::not_found("card"))?;
    Ok(Json(api_success(card)))
}

/// Request a loyalty card (or replace an existing one)
#[utoipa::path(
    post,
    path = "/api/v1/card",
    request_body = RequestCardRequest,
    responses(
        (status = 200, description = "Card issued, or confirmation required", body = CardIssuanceResponse),
        (status = 400, description = "Not enough orders for a card"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "card",
    security(("bearer_auth" = []))
)]
pub async fn request_card(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
    Json(request): Json<RequestCardRequest>,
) -> Result<Json<ApiResponse<CardIssuanceResponse>>, ApiError> {
    // An existing card is only replaced on explicit confirmation.
    if !request.confirm_replace {
        if let Some(existing) = server.cards.find_for_account(identity.account_id).await? {
            return Ok(Json(api_success(CardIssuanceResponse {
                require_confirmation: true,
                card: existing,
            })));
        }
    }

    let profile_url = format!(
        "{}/profile/{}",
        server.config.frontend_url.trim_end_matches('/'),
        identity.account_id
    );
    let filename = format!(
        "cust_{}_{}.png",
        identity.account_id,
        Utc::now().timestamp_millis()
    );
    let qr_path = server
        .qr
        .generate(&profile_url, &filename)
        .map_err(|e| ApiError::internal(format!("Failed to render QR code: {e}")))?;

    let issued = match server
        .cards
        .issue(
            &identity.as_customer(),
            Utc::now().date_naive(),
            Some(qr_path.to_string_lossy().into_owned()),
        )
        .await
    {
        Ok(issued) => issued,
        Err(e) => {
            // Don't leave the freshly rendered QR behind on failure.
            if let Err(cleanup) = std::fs::remove_file(&qr_path) {
                warn!(path = %qr_path.display(), error = %cleanup, "failed to remove orphaned QR code");
            }
            return Err(match e {
                EngineError::NotEligible { threshold, .. } => ApiError::bad_request(format!(
                    "You need at least {threshold} orders to generate a card"
                )),
                other => other.into(),
            });
        }
    };

    // Best-effort cleanup of the replaced card's QR artifact.
    if let Some(old_path) = issued.replaced.and_then(|card| card.qr_code_path) {
        if let Err(e) = std::fs::remove_file(&old_path) {
            warn!(path = %old_path, error = %e, "failed to remove replaced QR code");
        }
    }

    Ok(Json(api_success(CardIssuanceResponse {
        require_confirmation: false,
        card: issued.card,
    })))
}
