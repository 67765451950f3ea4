use sqlx::PgPool;
use tracing::debug;

use crate::dependants::DependantDirectory;
use crate::error::EngineResult;
use crate::models::{EligibilitySource, EligibilityVerdict};
use crate::month::BillingMonth;
use crate::policy::EligibilityPolicy;

/// Only completed orders count toward eligibility.
const QUALIFYING_ORDER_STATUS: &str = "completed";

/// Resolves whether an account qualifies for the subsidized healthcare
/// service in a given calendar month, either directly or through its
/// sponsor. This is the single authority for the check; every call site
/// (self-check, provider lookup, request creation, card scan) goes
/// through it.
#[derive(Clone)]
pub struct EligibilityResolver {
    pool: PgPool,
    policy: EligibilityPolicy,
    directory: DependantDirectory,
}

impl EligibilityResolver {
    pub fn new(pool: PgPool, policy: EligibilityPolicy) -> Self {
        let directory = DependantDirectory::new(pool.clone());
        Self {
            pool,
            policy,
            directory,
        }
    }

    pub fn policy(&self) -> &EligibilityPolicy {
        &self.policy
    }

    /// Resolve eligibility for `account_email` in `month`.
    ///
    /// An account that qualifies on its own order history always reports
    /// through the direct path, even when a dependant link also exists;
    /// the sponsor is consulted only after the direct check falls short.
    pub async fn resolve(
        &self,
        account_email: &str,
        month: BillingMonth,
    ) -> EngineResult<EligibilityVerdict> {
        let own_count = self.qualifying_order_count(account_email, month).await?;
        if own_count >= self.policy.order_threshold {
            return Ok(EligibilityVerdict {
                eligible: true,
                qualifying_order_count: own_count,
                sponsor_email: None,
                source: EligibilitySource::Direct,
            });
        }

        let Some(sponsor) = self.directory.find_sponsor_for(account_email).await? else {
            return Ok(EligibilityVerdict {
                eligible: false,
                qualifying_order_count: own_count,
                sponsor_email: None,
                source: EligibilitySource::Direct,
            });
        };

        let sponsor_count = self
            .qualifying_order_count(&sponsor.sponsor_email, month)
            .await?;
        debug!(
            account = %account_email,
            sponsor = %sponsor.sponsor_email,
            sponsor_count,
            %month,
            "eligibility resolved through sponsor"
        );

        Ok(EligibilityVerdict {
            eligible: sponsor_count >= self.policy.order_threshold,
            qualifying_order_count: sponsor_count,
            sponsor_email: Some(sponsor.sponsor_email),
            source: EligibilitySource::Sponsored,
        })
    }

    /// Completed orders for the email within the month.
    pub async fn qualifying_order_count(
        &self,
        account_email: &str,
        month: BillingMonth,
    ) -> EngineResult<i64> {
        let (start, end) = month.bounds();
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE LOWER(account_email) = LOWER($1)
              AND status = $2
              AND order_date >= $3 AND order_date < $4
            "#,
        )
        .bind(account_email)
        .bind(QUALIFYING_ORDER_STATUS)
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// All-time completed orders for the email, used by card issuance.
    pub async fn lifetime_order_count(&self, account_email: &str) -> EngineResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM orders
            WHERE LOWER(account_email) = LOWER($1) AND status = $2
            "#,
        )
        .bind(account_email)
        .bind(QUALIFYING_ORDER_STATUS)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
