use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::eligibility::EligibilityResolver;
use crate::error::{EngineError, EngineResult};
use crate::models::{BenefitRequest, CustomerRef, EligibilitySource, Fulfillment, RequestSubmission};
use crate::month::BillingMonth;
use crate::policy::EligibilityPolicy;
use crate::wallet;

/// Lifecycle of benefit requests: pending -> completed, nothing else.
///
/// Creation re-runs the eligibility resolver as its authorization gate and
/// couples the balance check, the ledger debit and the request insert in
/// one transaction. Completion is a single conditional update so that a
/// retry or a concurrent provider can succeed at most once.
#[derive(Clone)]
pub struct BenefitRequestLedger {
    pool: PgPool,
    policy: EligibilityPolicy,
    resolver: EligibilityResolver,
}

impl BenefitRequestLedger {
    pub fn new(pool: PgPool, policy: EligibilityPolicy) -> Self {
        let resolver = EligibilityResolver::new(pool.clone(), policy.clone());
        Self {
            pool,
            policy,
            resolver,
        }
    }

    /// Create a pending request for an eligible customer.
    pub async fn create(
        &self,
        requester: &CustomerRef,
        submission: &RequestSubmission,
        month: BillingMonth,
    ) -> EngineResult<BenefitRequest> {
        let verdict = self.resolver.resolve(&requester.email, month).await?;
        if !verdict.eligible {
            return Err(EngineError::NotEligible {
                qualifying_order_count: verdict.qualifying_order_count,
                threshold: self.policy.order_threshold,
                sponsor_email: verdict.sponsor_email,
            });
        }

        let mut tx = self.pool.begin().await?;

        let balance = wallet::card_balance(&mut tx, requester.account_id).await?;
        if balance < self.policy.balance_floor {
            return Err(EngineError::InsufficientBalance { balance });
        }

        let reference = wallet::ledger_reference("benefit");
        wallet::debit_card(
            &mut tx,
            requester,
            self.policy.request_fee,
            "Healthcare benefit request",
            &reference,
        )
        .await?;

        let sponsor_email = match verdict.source {
            EligibilitySource::Sponsored => verdict.sponsor_email.clone(),
            EligibilitySource::Direct => None,
        };

        let request = sqlx::query_as::<_, BenefitRequest>(
            r#"
            INSERT INTO benefit_requests (
                id, account_id, requester_email, sponsor_email,
                service_name, service_category, description, status, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(requester.account_id)
        .bind(&requester.email)
        .bind(&sponsor_email)
        .bind(&submission.service_name)
        .bind(&submission.service_category)
        .bind(&submission.description)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            request_id = %request.id,
            requester = %requester.email,
            source = ?verdict.source,
            "benefit request created"
        );
        Ok(request)
    }

    /// Transition a pending request to completed with the full fulfillment
    /// payload. The status guard makes concurrent completion succeed
    /// exactly once; a zero-row update reports the merged
    /// missing-or-already-completed outcome.
    pub async fn complete(&self, request_id: Uuid, fulfillment: &Fulfillment) -> EngineResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE benefit_requests SET
                status = 'completed',
                provider_reply = $2,
                provider_name = $3,
                facility_name = $4,
                admission_status = $5,
                duration = $6,
                diagnosis = $7,
                prescribed_treatment = $8,
                completed_at = NOW()
            WHERE id = $1 AND status <> 'completed'
            "#,
        )
        .bind(request_id)
        .bind(&fulfillment.provider_reply)
        .bind(&fulfillment.provider_name)
        .bind(&fulfillment.facility_name)
        .bind(&fulfillment.admission_status)
        .bind(&fulfillment.duration)
        .bind(&fulfillment.diagnosis)
        .bind(&fulfillment.prescribed_treatment)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::AlreadyCompletedOrMissing);
        }

        info!(request_id = %request_id, "benefit request completed");
        Ok(())
    }

    pub async fn get(&self, request_id: Uuid) -> EngineResult<BenefitRequest> {
        sqlx::query_as::<_, BenefitRequest>("SELECT * FROM benefit_requests WHERE id = $1")
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(EngineError::NotFound { resource: "request" })
    }

    /// Requests addressed to a provider's service, most recent first.
    pub async fn list_for_provider(&self, service_name: &str) -> EngineResult<Vec<BenefitRequest>> {
        let requests = sqlx::query_as::<_, BenefitRequest>(
            r#"
            SELECT * FROM benefit_requests
            WHERE service_name = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(service_name)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    pub async fn list_for_account(&self, account_id: Uuid) -> EngineResult<Vec<BenefitRequest>> {
        let requests = sqlx::query_as::<_, BenefitRequest>(
            r#"
            SELECT * FROM benefit_requests
            WHERE account_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }

    /// Requests a sponsor's dependants submitted within the month.
    pub async fn list_sponsored_by(
        &self,
        sponsor_email: &str,
        month: BillingMonth,
    ) -> EngineResult<Vec<BenefitRequest>> {
        let (start, end) = month.bounds();
        let requests = sqlx::query_as::<_, BenefitRequest>(
            r#"
            SELECT * FROM benefit_requests
            WHERE LOWER(sponsor_email) = LOWER($1)
              AND created_at >= $2 AND created_at < $3
            ORDER BY created_at DESC
            "#,
        )
        .bind(sponsor_email)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;
        Ok(requests)
    }
}
