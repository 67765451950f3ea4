use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use benefit_engine::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

/// Standard API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Error type/code
    pub error_type: String,
    /// Human-readable error message
    pub message: String,
    /// Field-specific validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<HashMap<String, Vec<String>>>,
    /// Timestamp when error occurred
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Standard API success response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

/// Response metadata for list endpoints
#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field_errors: Option<HashMap<String, Vec<String>>>,
    },

    #[error("Authentication error: {message}")]
    Authentication { message: String },

    #[error("Authorization error: {message}")]
    Authorization { message: String },

    #[error("Resource not found: {resource_type}")]
    NotFound { resource_type: String },

    #[error("Resource conflict: {message}")]
    Conflict { message: String },

    #[error("{message}")]
    NotEligible {
        message: String,
        qualifying_order_count: i64,
        sponsor_email: Option<String>,
    },

    #[error("Request not found or already completed")]
    RequestClosed,

    #[error("Payment verification failed")]
    PaymentNotVerified,

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Upstream service error: {message}")]
    Network { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

impl ApiError {
    /// Create a simple validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field_errors: None,
        }
    }

    /// Create an authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
        }
    }

    /// Create an authorization error
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource_type: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
        }
    }

    /// Create a conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Authorization { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::NotEligible { .. } => StatusCode::BAD_REQUEST,
            ApiError::RequestClosed => StatusCode::NOT_FOUND,
            ApiError::PaymentNotVerified => StatusCode::BAD_REQUEST,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Network { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::Authorization { .. } => "authorization_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::NotEligible { .. } => "not_eligible",
            ApiError::RequestClosed => "not_found",
            ApiError::PaymentNotVerified => "payment_not_verified",
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::Network { .. } => "network_error",
            ApiError::Database(_) => "database_error",
            ApiError::Internal { .. } => "internal_error",
            ApiError::Configuration { .. } => "configuration_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        // Log with correlation ID; internals stay out of the response body
        error!(
            error_id = %error_id,
            error_type = %self.error_type(),
            status_code = %status_code.as_u16(),
            error = %self,
            "API error occurred"
        );

        let field_errors = match &self {
            ApiError::Validation { field_errors, .. } => field_errors.clone(),
            _ => None,
        };

        let message = match &self {
            ApiError::Database(_) | ApiError::Internal { .. } | ApiError::Configuration { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
            _ => self.to_string(),
        };

        let error_response = ApiErrorResponse {
            error_id,
            error_type: self.error_type().to_string(),
            message,
            field_errors,
            timestamp: chrono::Utc::now(),
        };

        (status_code, Json(error_response)).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(message) => ApiError::validation(message),
            EngineError::NotFound { resource } => ApiError::not_found(resource),
            EngineError::Conflict(message) => ApiError::conflict(message),
            EngineError::NotEligible {
                qualifying_order_count,
                threshold,
                sponsor_email,
            } => {
                let message = match &sponsor_email {
                    Some(sponsor) => format!(
                        "You're not eligible because the sponsor account ({sponsor}) hasn't \
                         made {threshold} orders this month."
                    ),
                    None => format!(
                        "You are not eligible. You need at least {threshold} orders this month; \
                         you currently have {qualifying_order_count}."
                    ),
                };
                ApiError::NotEligible {
                    message,
                    qualifying_order_count,
                    sponsor_email,
                }
            }
            EngineError::AlreadyCompletedOrMissing => ApiError::RequestClosed,
            EngineError::InsufficientBalance { .. } => {
                ApiError::bad_request("Insufficient balance! Please top up your account.")
            }
            EngineError::PaymentNotVerified { .. } => ApiError::PaymentNotVerified,
            EngineError::Gateway(e) => ApiError::Network {
                message: e.to_string(),
            },
            EngineError::Database(e) => ApiError::Database(e),
        }
    }
}

/// Helper function to create successful API responses
pub fn api_success<T>(data: T) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: None,
    }
}

/// Helper function to create successful API responses with a total count
pub fn api_success_with_total<T>(data: T, total_count: i64) -> ApiResponse<T> {
    ApiResponse {
        success: true,
        data,
        metadata: Some(ResponseMetadata {
            total_count: Some(total_count),
        }),
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
