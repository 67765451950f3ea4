use chrono::{Months, NaiveDate};
use rand::Rng;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::eligibility::EligibilityResolver;
use crate::error::{EngineError, EngineResult};
use crate::models::{Card, CustomerRef};
use crate::policy::EligibilityPolicy;

const CARD_STATUS_ACTIVE: &str = "active";
const CARD_VALIDITY_MONTHS: u32 = 36;

/// Outcome of issuing a card: the fresh card plus the replaced one, if
/// any, so the caller can clean up its QR artifact.
#[derive(Debug)]
pub struct IssuedCard {
    pub card: Card,
    pub replaced: Option<Card>,
}

/// Loyalty card issuance and lookup.
#[derive(Clone)]
pub struct CardService {
    pool: PgPool,
    policy: EligibilityPolicy,
    resolver: EligibilityResolver,
}

impl CardService {
    pub fn new(pool: PgPool, policy: EligibilityPolicy) -> Self {
        let resolver = EligibilityResolver::new(pool.clone(), policy.clone());
        Self {
            pool,
            policy,
            resolver,
        }
    }

    pub async fn find_for_account(&self, account_id: Uuid) -> EngineResult<Option<Card>> {
        let card = sqlx::query_as::<_, Card>("SELECT * FROM cards WHERE account_id = $1")
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(card)
    }

    /// Issue a card for the account, replacing any existing one. Requires
    /// the lifetime order count to meet the policy threshold.
    pub async fn issue(
        &self,
        account: &CustomerRef,
        issued_on: NaiveDate,
        qr_code_path: Option<String>,
    ) -> EngineResult<IssuedCard> {
        let order_count = self.resolver.lifetime_order_count(&account.email).await?;
        if order_count < self.policy.order_threshold {
            return Err(EngineError::NotEligible {
                qualifying_order_count: order_count,
                threshold: self.policy.order_threshold,
                sponsor_email: None,
            });
        }

        let expiry_date = issued_on
            .checked_add_months(Months::new(CARD_VALIDITY_MONTHS))
            .ok_or_else(|| EngineError::Validation("card expiry out of range".to_string()))?;

        let mut tx = self.pool.begin().await?;

        let replaced = sqlx::query_as::<_, Card>(
            "DELETE FROM cards WHERE account_id = $1 RETURNING *",
        )
        .bind(account.account_id)
        .fetch_optional(&mut *tx)
        .await?;

        let card = sqlx::query_as::<_, Card>(
            r#"
            INSERT INTO cards (
                id, account_id, account_email, card_number, expiry_date,
                cvc, balance, status, qr_code_path, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(account.account_id)
        .bind(&account.email)
        .bind(generate_card_number())
        .bind(expiry_date)
        .bind(generate_cvc())
        .bind(Decimal::ZERO)
        .bind(CARD_STATUS_ACTIVE)
        .bind(&qr_code_path)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            account = %account.email,
            card_id = %card.id,
            replaced = replaced.is_some(),
            "loyalty card issued"
        );
        Ok(IssuedCard { card, replaced })
    }
}

/// 16-digit card number with a Visa-like leading 4.
fn generate_card_number() -> String {
    let mut rng = rand::thread_rng();
    let mut number = String::from("4");
    for _ in 0..15 {
        number.push(char::from(b'0' + rng.gen_range(0..10)));
    }
    number
}

fn generate_cvc() -> String {
    rand::thread_rng().gen_range(100..1000).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_numbers_are_sixteen_digits_with_visa_prefix() {
        let number = generate_card_number();
        assert_eq!(number.len(), 16);
        assert!(number.starts_with('4'));
        assert!(number.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn cvc_is_three_digits() {
        for _ in 0..50 {
            let cvc = generate_cvc();
            assert_eq!(cvc.len(), 3);
            assert!(cvc.chars().all(|c| c.is_ascii_digit()));
        }
    }
}
