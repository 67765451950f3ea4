use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{GatewayError, GatewayResult};

/// The gateway call sits in the synchronous request path; keep it short.
pub const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

const SUCCESS_STATUS: &str = "success";

/// Result of verifying a payment reference. Amounts are in integer minor
/// units, as reported by the gateway.
#[derive(Debug, Clone)]
pub struct PaymentVerification {
    pub succeeded: bool,
    pub amount_minor: i64,
}

/// Seam for the payment gateway, so callers can be exercised without
/// network access.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    async fn verify(&self, reference: &str) -> GatewayResult<PaymentVerification>;
}

#[derive(Debug, Deserialize)]
struct VerifyEnvelope {
    status: bool,
    data: Option<VerifyData>,
}

#[derive(Debug, Deserialize)]
struct VerifyData {
    status: String,
    amount: i64,
}

/// HTTP client for a Paystack-style verification endpoint.
#[derive(Clone)]
pub struct HttpPaymentGateway {
    base_url: String,
    secret_key: String,
    client: reqwest::Client,
}

impl HttpPaymentGateway {
    pub fn new(base_url: impl Into<String>, secret_key: impl Into<String>) -> GatewayResult<Self> {
        let client = reqwest::Client::builder().timeout(VERIFY_TIMEOUT).build()?;
        Ok(Self {
            base_url: base_url.into(),
            secret_key: secret_key.into(),
            client,
        })
    }
}

#[async_trait]
impl PaymentVerifier for HttpPaymentGateway {
    async fn verify(&self, reference: &str) -> GatewayResult<PaymentVerification> {
        let url = format!(
            "{}/transaction/verify/{}",
            self.base_url.trim_end_matches('/'),
            reference
        );
        debug!(reference, "verifying payment with gateway");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        // The gateway answers 4xx for unknown or rejected references;
        // that is a failed verification, not an infrastructure error.
        if response.status().is_client_error() {
            warn!(reference, status = %response.status(), "gateway rejected reference");
            return Ok(PaymentVerification {
                succeeded: false,
                amount_minor: 0,
            });
        }
        let response = response.error_for_status()?;

        let envelope: VerifyEnvelope = response.json().await?;
        let data = envelope.data.ok_or_else(|| {
            GatewayError::UnexpectedResponse("missing data object".to_string())
        })?;

        Ok(PaymentVerification {
            succeeded: envelope.status && data.status == SUCCESS_STATUS,
            amount_minor: data.amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_envelope_deserializes() {
        let raw = r#"{"status": true, "data": {"status": "success", "amount": 250000}}"#;
        let envelope: VerifyEnvelope = serde_json::from_str(raw).unwrap();
        assert!(envelope.status);
        let data = envelope.data.unwrap();
        assert_eq!(data.status, "success");
        assert_eq!(data.amount, 250_000);
    }

    #[test]
    fn failed_envelope_deserializes_without_data() {
        let raw = r#"{"status": false, "data": null}"#;
        let envelope: VerifyEnvelope = serde_json::from_str(raw).unwrap();
        assert!(!envelope.status);
        assert!(envelope.data.is_none());
    }
}
