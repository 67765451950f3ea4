use axum::{
    extract::{Path, State},
    Json,
};
use benefit_engine::{BenefitRequest, BillingMonth, Fulfillment};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::ProviderIdentity;
use crate::error::{api_success, api_success_with_total, ApiError, ApiResponse};
use crate::handlers::benefits::EligibilityResponse;
use crate::server::CarelinkServer;
use crate::validation::RequestValidation;

/// Fulfillment payload a provider submits when closing out a request.
/// Every field is required; the update is all-or-nothing.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CompleteRequestRequest {
    pub provider_reply: String,
    pub provider_name: String,
    pub facility_name: String,
    pub admission_status: String,
    pub duration: String,
    pub diagnosis: String,
    pub prescribed_treatment: String,
}

impl RequestValidation for CompleteRequestRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.provider_reply, "Provider reply is required");
        validate_required!(self.provider_name, "Provider name is required");
        validate_required!(self.facility_name, "Facility name is required");
        validate_required!(self.admission_status, "Admission status is required");
        validate_required!(self.duration, "Duration is required");
        validate_required!(self.diagnosis, "Diagnosis is required");
        validate_required!(self.prescribed_treatment, "Prescribed treatment is required");
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CustomerLookupResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub eligibility: EligibilityResponse,
}

#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    display_name: String,
}

/// List requests addressed to the provider's service
#[utoipa::path(
    get,
    path = "/api/v1/provider/requests",
    responses(
        (status = 200, description = "Requests retrieved", body = Vec<BenefitRequest>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "provider",
    security(("bearer_auth" = []))
)]
pub async fn list_requests(
    State(server): State<CarelinkServer>,
    provider: ProviderIdentity,
) -> Result<Json<ApiResponse<Vec<BenefitRequest>>>, ApiError> {
    let requests = server
        .requests
        .list_for_provider(&provider.service_name)
        .await?;
    let total = requests.len() as i64;
    Ok(Json(api_success_with_total(requests, total)))
}

/// Get a single request
#[utoipa::path(
    get,
    path = "/api/v1/provider/requests/{request_id}",
    params(
        ("request_id" = Uuid, Path, description = "Benefit request ID")
    ),
    responses(
        (status = 200, description = "Request retrieved", body = BenefitRequest),
        (status = 404, description = "Request not found"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "provider",
    security(("bearer_auth" = []))
)]
pub async fn get_request(
    State(server): State<CarelinkServer>,
    Path(request_id): Path<Uuid>,
    _provider: ProviderIdentity,
) -> Result<Json<ApiResponse<BenefitRequest>>, ApiError> {
    let request = server.requests.get(request_id).await?;
    Ok(Json(api_success(request)))
}

/// Complete a pending request with the provider's reply
#[utoipa::path(
    put,
    path = "/api/v1/provider/requests/{request_id}/complete",
    params(
        ("request_id" = Uuid, Path, description = "Benefit request ID")
    ),
    request_body = CompleteRequestRequest,
    responses(
        (status = 200, description = "Request completed", body = BenefitRequest),
        (status = 404, description = "Request not found or already completed"),
        (status = 400, description = "Invalid fulfillment payload"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "provider",
    security(("bearer_auth" = []))
)]
pub async fn complete_request(
    State(server): State<CarelinkServer>,
    Path(request_id): Path<Uuid>,
    provider: ProviderIdentity,
    Json(request): Json<CompleteRequestRequest>,
) -> Result<Json<ApiResponse<BenefitRequest>>, ApiError> {
    request.validate()?;

    let fulfillment = Fulfillment {
        provider_reply: request.provider_reply,
        provider_name: request.provider_name,
        facility_name: request.facility_name,
        admission_status: request.admission_status,
        duration: request.duration,
        diagnosis: request.diagnosis,
        prescribed_treatment: request.prescribed_treatment,
    };
    server.requests.complete(request_id, &fulfillment).await?;

    let completed = server.requests.get(request_id).await?;

    // Notify the requester once the update has committed; delivery
    // problems never surface to the provider.
    server.email.dispatch(
        completed.requester_email.clone(),
        format!("Your {} request has been completed", completed.service_name),
        format!(
            "<h2>Your healthcare request has been completed</h2>\
             <p>{} at {} has replied to your {} request.</p>\
             <p>Log in to view the full reply and your prescribed treatment.</p>",
            fulfillment.provider_name, fulfillment.facility_name, completed.service_category
        ),
    );

    tracing::info!(
        request_id = %request_id,
        provider = %provider.service_name,
        "request completed by provider"
    );
    Ok(Json(api_success(completed)))
}

/// Look up a customer by account ID or email (QR scan or manual entry),
/// including a live eligibility verdict
#[utoipa::path(
    get,
    path = "/api/v1/provider/customers/{id_or_email}",
    params(
        ("id_or_email" = String, Path, description = "Account ID or email address")
    ),
    responses(
        (status = 200, description = "Customer retrieved", body = CustomerLookupResponse),
        (status = 404, description = "Customer not found"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "provider",
    security(("bearer_auth" = []))
)]
pub async fn lookup_customer(
    State(server): State<CarelinkServer>,
    Path(id_or_email): Path<String>,
    _provider: ProviderIdentity,
) -> Result<Json<ApiResponse<CustomerLookupResponse>>, ApiError> {
    let account = match Uuid::parse_str(&id_or_email) {
        Ok(account_id) => {
            sqlx::query_as::<_, AccountRow>(
                "SELECT id, email, display_name FROM accounts WHERE id = $1",
            )
            .bind(account_id)
            .fetch_optional(&server.db_pool)
            .await?
        }
        Err(_) => {
            sqlx::query_as::<_, AccountRow>(
                "SELECT id, email, display_name FROM accounts WHERE LOWER(email) = LOWER($1)",
            )
            .bind(&id_or_email)
            .fetch_optional(&server.db_pool)
            .await?
        }
    };
    let account = account.ok_or_else(|| ApiError::not_found("customer"))?;

    let month = BillingMonth::from_datetime(Utc::now());
    let verdict = server.resolver.resolve(&account.email, month).await?;
    let message = verdict.message(server.resolver.policy().order_threshold);

    Ok(Json(api_success(CustomerLookupResponse {
        id: account.id,
        name: account.display_name,
        email: account.email,
        eligibility: EligibilityResponse {
            eligible: verdict.eligible,
            qualifying_order_count: verdict.qualifying_order_count,
            sponsor_email: verdict.sponsor_email,
            source: verdict.source,
            message,
        },
    })))
}
