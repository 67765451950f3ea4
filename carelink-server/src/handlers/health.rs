use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use std::collections::HashMap;

use crate::server::CarelinkServer;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub checks: HashMap<String, String>,
}

/// Version information response
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub name: String,
    pub version: String,
}

/// Health check handler
pub async fn health_check(
    State(server): State<CarelinkServer>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let mut checks = HashMap::new();

    let database_status = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&server.db_pool)
        .await
    {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };
    checks.insert("database".to_string(), database_status.to_string());

    let status = if database_status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks,
    }))
}

/// Version information handler
pub async fn version_info() -> Json<VersionResponse> {
    Json(VersionResponse {
        name: "CareLink Engine".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
