use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Business-rule gate failure, carrying enough context for a
    /// user-facing message.
    #[error("Not eligible: {qualifying_order_count} of {threshold} qualifying orders")]
    NotEligible {
        qualifying_order_count: i64,
        threshold: i64,
        sponsor_email: Option<String>,
    },

    /// Completion hit a request that is missing or already completed.
    /// The two causes are deliberately not distinguished.
    #[error("Request not found or already completed")]
    AlreadyCompletedOrMissing,

    #[error("Insufficient balance: {balance}")]
    InsufficientBalance { balance: Decimal },

    #[error("Payment verification failed for reference {reference}")]
    PaymentNotVerified { reference: String },

    #[error("Payment gateway error: {0}")]
    Gateway(#[from] payment_gateway::GatewayError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Postgres unique-violation detection, used where a constraint backs a
/// business rule (duplicate dependant link, replayed top-up reference).
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .map(|code| code == "23505")
        .unwrap_or(false)
}
