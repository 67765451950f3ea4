use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Payment gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected gateway response: {0}")]
    UnexpectedResponse(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;
