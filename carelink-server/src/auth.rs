//! Bearer-token identity extraction
//!
//! The identity provider issues HS256 JWTs carrying the account triple
//! (id, email, name); provider tokens additionally carry the healthcare
//! service name. Handlers receive the verified identity through the
//! extractors below and trust it without re-checking account existence.

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header::AUTHORIZATION, request::Parts};
use benefit_engine::CustomerRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::server::CarelinkServer;

/// JWT claims issued by the identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    /// Present only on healthcare-provider credentials.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_name: Option<String>,
    pub exp: i64,
}

/// Authenticated customer account.
#[derive(Debug, Clone)]
pub struct CustomerIdentity {
    pub account_id: Uuid,
    pub email: String,
    pub name: String,
}

impl CustomerIdentity {
    pub fn as_customer(&self) -> CustomerRef {
        CustomerRef {
            account_id: self.account_id,
            email: self.email.clone(),
            name: self.name.clone(),
        }
    }
}

/// Authenticated healthcare provider.
#[derive(Debug, Clone)]
pub struct ProviderIdentity {
    pub provider_id: Uuid,
    pub email: String,
    pub service_name: String,
}

/// Extract the bearer token from the Authorization header.
fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| ApiError::authentication("Missing Authorization header"))?;

    auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        ApiError::authentication("Invalid Authorization header format. Expected: Bearer <token>")
    })
}

/// Validate the token signature and expiry, yielding its claims.
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, ApiError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| ApiError::authentication(format!("Invalid token: {e}")))?;
    Ok(data.claims)
}

/// Sign a token for the given claims. Login lives with the identity
/// provider; this is for operational tooling and tests.
pub fn issue_token(claims: &Claims, secret: &str) -> Result<String, ApiError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::internal(format!("Failed to sign token: {e}")))
}

#[async_trait]
impl FromRequestParts<CarelinkServer> for CustomerIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CarelinkServer,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = decode_claims(token, &state.config.jwt_secret)?;
        if claims.service_name.is_some() {
            return Err(ApiError::authorization(
                "A customer credential is required for this endpoint",
            ));
        }
        Ok(CustomerIdentity {
            account_id: claims.sub,
            email: claims.email,
            name: claims.name,
        })
    }
}

#[async_trait]
impl FromRequestParts<CarelinkServer> for ProviderIdentity {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CarelinkServer,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = decode_claims(token, &state.config.jwt_secret)?;
        let Some(service_name) = claims.service_name else {
            return Err(ApiError::authorization(
                "A healthcare-provider credential is required for this endpoint",
            ));
        };
        Ok(ProviderIdentity {
            provider_id: claims.sub,
            email: claims.email,
            service_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(service_name: Option<&str>) -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            name: "Jane Doe".to_string(),
            service_name: service_name.map(str::to_string),
            exp: (chrono::Utc::now() + chrono::Duration::days(7)).timestamp(),
        }
    }

    #[test]
    fn token_round_trip_preserves_claims() {
        let original = claims(None);
        let token = issue_token(&original, "test-secret").unwrap();
        let decoded = decode_claims(&token, "test-secret").unwrap();
        assert_eq!(decoded.sub, original.sub);
        assert_eq!(decoded.email, original.email);
        assert!(decoded.service_name.is_none());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&claims(None), "test-secret").unwrap();
        assert!(decode_claims(&token, "other-secret").is_err());
    }

    #[test]
    fn provider_claims_carry_service_name() {
        let token = issue_token(&claims(Some("City Clinic")), "test-secret").unwrap();
        let decoded = decode_claims(&token, "test-secret").unwrap();
        assert_eq!(decoded.service_name.as_deref(), Some("City Clinic"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut expired = claims(None);
        expired.exp = (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp();
        let token = issue_token(&expired, "test-secret").unwrap();
        assert!(decode_claims(&token, "test-secret").is_err());
    }
}
