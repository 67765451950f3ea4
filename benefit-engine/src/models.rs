use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Authenticated customer triple, as verified by the identity provider.
/// The engine trusts it without re-checking account existence per call.
#[derive(Debug, Clone)]
pub struct CustomerRef {
    pub account_id: Uuid,
    pub email: String,
    pub name: String,
}

/// Which order history satisfied (or failed) the eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum EligibilitySource {
    Direct,
    Sponsored,
}

/// Outcome of an eligibility resolution.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EligibilityVerdict {
    pub eligible: bool,
    pub qualifying_order_count: i64,
    pub sponsor_email: Option<String>,
    pub source: EligibilitySource,
}

impl EligibilityVerdict {
    /// User-facing summary of the verdict.
    pub fn message(&self, threshold: i64) -> String {
        match (self.eligible, self.source) {
            (true, EligibilitySource::Direct) => {
                "You have enough orders to access healthcare services.".to_string()
            }
            (true, EligibilitySource::Sponsored) => format!(
                "You qualify through your sponsor account ({}).",
                self.sponsor_email.as_deref().unwrap_or("unknown")
            ),
            (false, EligibilitySource::Direct) => format!(
                "You need at least {} orders this month to access healthcare services. \
                 You currently have {}.",
                threshold, self.qualifying_order_count
            ),
            (false, EligibilitySource::Sponsored) => format!(
                "You're not eligible because the sponsor account ({}) hasn't made {} \
                 orders this month.",
                self.sponsor_email.as_deref().unwrap_or("unknown"),
                threshold
            ),
        }
    }
}

/// A sponsorship link. Keyed by the (sponsor, dependant) pair; a dependant
/// has at most one sponsor.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct DependantLink {
    pub id: Uuid,
    pub sponsor_id: Uuid,
    pub sponsor_email: String,
    pub sponsor_name: String,
    pub dependant_id: Uuid,
    pub dependant_email: String,
    pub dependant_name: String,
    pub created_at: DateTime<Utc>,
}

/// Sponsor side of a dependant link, as returned by sponsor lookup.
#[derive(Debug, Clone, FromRow)]
pub struct SponsorRef {
    pub sponsor_id: Uuid,
    pub sponsor_email: String,
    pub sponsor_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "request_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Completed,
}

/// One ask for the subsidized healthcare service.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct BenefitRequest {
    pub id: Uuid,
    pub account_id: Uuid,
    pub requester_email: String,
    /// Set only when the requester qualified through a sponsor.
    pub sponsor_email: Option<String>,
    pub service_name: String,
    pub service_category: String,
    pub description: String,
    pub status: RequestStatus,
    pub provider_reply: Option<String>,
    pub provider_name: Option<String>,
    pub facility_name: Option<String>,
    pub admission_status: Option<String>,
    pub duration: Option<String>,
    pub diagnosis: Option<String>,
    pub prescribed_treatment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Everything a provider supplies when closing out a request. All fields
/// are applied in one update; a request is immutable once completed.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct Fulfillment {
    pub provider_reply: String,
    pub provider_name: String,
    pub facility_name: String,
    pub admission_status: String,
    pub duration: String,
    pub diagnosis: String,
    pub prescribed_treatment: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RequestSubmission {
    pub service_name: String,
    pub service_category: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "entry_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Credit,
    Debit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, sqlx::Type)]
#[sqlx(type_name = "balance_store", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BalanceStore {
    Card,
    Wallet,
}

/// Immutable audit record of a single balance mutation. Amounts are signed:
/// credits positive, debits negative.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub account_email: String,
    pub store: BalanceStore,
    pub entry_type: EntryType,
    pub amount: Decimal,
    pub description: String,
    pub reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Loyalty card with a cached balance and a QR code pointing at the
/// customer profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, FromRow)]
pub struct Card {
    pub id: Uuid,
    pub account_id: Uuid,
    pub account_email: String,
    pub card_number: String,
    pub expiry_date: NaiveDate,
    pub cvc: String,
    pub balance: Decimal,
    pub status: String,
    pub qr_code_path: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(
        eligible: bool,
        count: i64,
        sponsor: Option<&str>,
        source: EligibilitySource,
    ) -> EligibilityVerdict {
        EligibilityVerdict {
            eligible,
            qualifying_order_count: count,
            sponsor_email: sponsor.map(str::to_string),
            source,
        }
    }

    #[test]
    fn ineligible_direct_message_names_the_shortfall() {
        let v = verdict(false, 2, None, EligibilitySource::Direct);
        let message = v.message(4);
        assert!(message.contains("at least 4 orders"));
        assert!(message.contains("currently have 2"));
    }

    #[test]
    fn ineligible_sponsored_message_names_the_sponsor() {
        let v = verdict(false, 1, Some("parent@example.com"), EligibilitySource::Sponsored);
        assert!(v.message(4).contains("parent@example.com"));
    }

    #[test]
    fn eligible_sponsored_message_names_the_sponsor() {
        let v = verdict(true, 5, Some("parent@example.com"), EligibilitySource::Sponsored);
        assert!(v.message(4).contains("parent@example.com"));
    }
}
