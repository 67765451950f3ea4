use axum::{
    extract::{Path, State},
    Json,
};
use benefit_engine::DependantLink;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::CustomerIdentity;
use crate::error::{api_success, api_success_with_total, ApiError, ApiResponse};
use crate::server::CarelinkServer;
use crate::validation::RequestValidation;

/// Add Dependant payload
#[derive(Debug, Deserialize, ToSchema)]
pub struct AddDependantRequest {
    pub dependant_email: String,
}

impl RequestValidation for AddDependantRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.dependant_email, "Dependant email is required");
        validate_email!(self.dependant_email, "Invalid email format");
        Ok(())
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DependantStatusResponse {
    pub is_dependant: bool,
}

/// List the caller's dependants
#[utoipa::path(
    get,
    path = "/api/v1/dependants",
    responses(
        (status = 200, description = "Dependants retrieved", body = Vec<DependantLink>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "dependants",
    security(("bearer_auth" = []))
)]
pub async fn list_dependants(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
) -> Result<Json<ApiResponse<Vec<DependantLink>>>, ApiError> {
    let links = server.directory.list_for_sponsor(identity.account_id).await?;
    let total = links.len() as i64;
    Ok(Json(api_success_with_total(links, total)))
}

/// Register another customer as the caller's dependant
#[utoipa::path(
    post,
    path = "/api/v1/dependants",
    request_body = AddDependantRequest,
    responses(
        (status = 200, description = "Dependant added", body = DependantLink),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "No customer with that email"),
        (status = 409, description = "Already a dependant"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "dependants",
    security(("bearer_auth" = []))
)]
pub async fn add_dependant(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
    Json(request): Json<AddDependantRequest>,
) -> Result<Json<ApiResponse<DependantLink>>, ApiError> {
    request.validate()?;

    let link = server
        .directory
        .add_link(&identity.as_customer(), &request.dependant_email)
        .await?;
    Ok(Json(api_success(link)))
}

/// Remove one of the caller's dependants
#[utoipa::path(
    delete,
    path = "/api/v1/dependants/{dependant_id}",
    params(
        ("dependant_id" = Uuid, Path, description = "Dependant account ID")
    ),
    responses(
        (status = 200, description = "Dependant removed"),
        (status = 404, description = "Dependant not found"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "dependants",
    security(("bearer_auth" = []))
)]
pub async fn remove_dependant(
    State(server): State<CarelinkServer>,
    Path(dependant_id): Path<Uuid>,
    identity: CustomerIdentity,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    server
        .directory
        .remove_link(identity.account_id, dependant_id)
        .await?;
    Ok(Json(api_success(())))
}

/// Report whether the caller is registered as someone's dependant
#[utoipa::path(
    get,
    path = "/api/v1/dependants/status",
    responses(
        (status = 200, description = "Dependant status", body = DependantStatusResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    tag = "dependants",
    security(("bearer_auth" = []))
)]
pub async fn dependant_status(
    State(server): State<CarelinkServer>,
    identity: CustomerIdentity,
) -> Result<Json<ApiResponse<DependantStatusResponse>>, ApiError> {
    let is_dependant = server.directory.is_dependant(&identity.email).await?;
    Ok(Json(api_success(DependantStatusResponse { is_dependant })))
}
