use axum::{extract::State, Json};
use benefit_engine::{BenefitRequest, BillingMonth, EligibilitySource, RequestSubmission};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CustomerIdentity;
use crate::error::{api_success, api_success_with_total, ApiError, ApiResponse};
use crate::server::CarelinkServer;
use crate::validation::RequestValidation;

/// Eligibility verdict with a rendered user-facing message.
#[derive(Debug, Serialize, ToSchema)]
pub struct EligibilityResponse {
    pub eligible: bool,
    pub qualifying_order_count: i64,
    pub sponsor_email: Option<String>,
    pub source: EligibilitySource,
    pub message: String,
}

/// One storefront order, as listed on the benefits screen.
#[derive(Debug, Serialize, ToSchema, FromRow)]
pub struct OrderSummary {
    pub id: Uuid,
    pub product_name: String,
    pub order_date: DateTime<Utc>,
    pub amount: Decimal,
    pub payment_method: String,
    pub status: String,
    pub transaction_reference: Option<String>,
}

/// Create Benefit Request payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBenefitRequestRequest {
    pub service_name: String,
    pub service_category: String,
    pub description: String,
}

impl RequestValidation for CreateBenefitRequestRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.service_name, "Healthcare service is required");
        validate_required!(self.service_category, "Service selection is required");
        validate_required!(self.description, "Service description is required");
        validate_length!(
            self.description,
            1,
            2000,
            "Description must be at most 2000 characters"
        );
        Ok(())
    }
}

/// Check the caller's eligibility for the current calendar month
#[utoipa::path(
    get,
    path = "/api/v1/benefits/eligibility",
    responses(
        (status = 200, description = "Eligibility verdict", body = EligibilityResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "benefits",
    security(("bearer_auth" = []))
)]
pub async fn get_eligibility(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
) -> Result<Json<ApiResponse<EligibilityResponse>>, ApiError> {
    let month = BillingMonth::from_datetime(Utc::now());
    let verdict = server.resolver.resolve(&identity.email, month).await?;
    let message = verdict.message(server.resolver.policy().order_threshold);

    Ok(Json(api_success(EligibilityResponse {
        eligible: verdict.eligible,
        qualifying_order_count: verdict.qualifying_order_count,
        sponsor_email: verdict.sponsor_email,
        source: verdict.source,
        message,
    })))
}

/// List the caller's orders for the current calendar month
#[utoipa::path(
    get,
    path = "/api/v1/benefits/orders",
    responses(
        (status = 200, description = "Orders for the current month", body = Vec<OrderSummary>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "benefits",
    security(("bearer_auth" = []))
)]
pub async fn list_monthly_orders(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
) -> Result<Json<ApiResponse<Vec<OrderSummary>>>, ApiError> {
    let month = BillingMonth::from_datetime(Utc::now());
    let (start, end) = month.bounds();

    let orders = sqlx::query_as::<_, OrderSummary>(
        r#"
        SELECT id, product_name, order_date, amount, payment_method, status,
               transaction_reference
        FROM orders
        WHERE LOWER(account_email) = LOWER($1)
          AND order_date >= $2 AND order_date < $3
        ORDER BY order_date DESC
        "#,
    )
    .bind(&identity.email)
    .bind(start)
    .bind(end)
    .fetch_all(&server.db_pool)
    .await?;

    let total = orders.len() as i64;
    Ok(Json(api_success_with_total(orders, total)))
}

/// Submit a benefit request (eligibility-gated)
#[utoipa::path(
    post,
    path = "/api/v1/benefits/requests",
    request_body = CreateBenefitRequestRequest,
    responses(
        (status = 200, description = "Request submitted", body = BenefitRequest),
        (status = 400, description = "Not eligible or invalid request"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "benefits",
    security(("bearer_auth" = []))
)]
pub async fn create_benefit_request(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
    Json(request): Json<CreateBenefitRequestRequest>,
) -> Result<Json<ApiResponse<BenefitRequest>>, ApiError> {
    request.validate()?;

    let submission = RequestSubmission {
        service_name: request.service_name,
        service_category: request.service_category,
        description: request.description,
    };
    let month = BillingMonth::from_datetime(Utc::now());
    let created = server
        .requests
        .create(&identity.as_customer(), &submission, month)
        .await?;

    Ok(Json(api_success(created)))
}

/// List the caller's own benefit requests, most recent first
#[utoipa::path(
    get,
    path = "/api/v1/benefits/requests",
    responses(
        (status = 200, description = "Requests retrieved", body = Vec<BenefitRequest>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "benefits",
    security(("bearer_auth" = []))
)]
pub async fn list_my_requests(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
) -> Result<Json<ApiResponse<Vec<BenefitRequest>>>, ApiError> {
    let requests = server.requests.list_for_account(identity.account_id).await?;
    let total = requests.len() as i64;
    Ok(Json(api_success_with_total(requests, total)))
}

/// List requests the caller's dependants submitted this month
#[utoipa::path(
    get,
    path = "/api/v1/benefits/sponsored",
    responses(
        (status = 200, description = "Sponsored requests retrieved", body = Vec<BenefitRequest>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "benefits",
    security(("bearer_auth" = []))
)]
pub async fn list_sponsored_requests(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
) -> Result<Json<ApiResponse<Vec<BenefitRequest>>>, ApiError> {
    let month = BillingMonth::from_datetime(Utc::now());
    let requests = server
        .requests
        .list_sponsored_by(&identity.email, month)
        .await?;
    let total = requests.len() as i64;
    Ok(Json(api_success_with_total(requests, total)))
}
