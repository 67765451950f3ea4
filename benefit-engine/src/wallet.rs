use std::sync::Arc;

use payment_gateway::PaymentVerifier;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::error::{is_unique_violation, EngineError, EngineResult};
use crate::models::{BalanceStore, CustomerRef, EntryType, LedgerEntry};

/// Generate a unique transaction reference, e.g. `benefit_1f3a9c2d`.
pub fn ledger_reference(prefix: &str) -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(8);
    format!("{prefix}_{id}")
}

/// Append one signed entry to the audit ledger. Every balance mutation
/// goes through here, inside the same transaction as the mutation itself.
async fn append_entry(
    tx: &mut Transaction<'_, Postgres>,
    account_email: &str,
    store: BalanceStore,
    entry_type: EntryType,
    amount: Decimal,
    description: &str,
    reference: Option<&str>,
) -> EngineResult<()> {
    sqlx::query(
        r#"
        INSERT INTO ledger_entries (
            id, account_email, store, entry_type, amount, description, reference, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(account_email)
    .bind(store)
    .bind(entry_type)
    .bind(amount)
    .bind(description)
    .bind(reference)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Current card balance, locked for the remainder of the transaction.
/// An account without a card reads as zero.
pub async fn card_balance(
    tx: &mut Transaction<'_, Postgres>,
    account_id: Uuid,
) -> EngineResult<Decimal> {
    let balance: Option<Decimal> =
        sqlx::query_scalar("SELECT balance FROM cards WHERE account_id = $1 FOR UPDATE")
            .bind(account_id)
            .fetch_optional(&mut **tx)
            .await?;
    Ok(balance.unwrap_or(Decimal::ZERO))
}

/// Debit the card balance and record the matching ledger entry. Returns
/// the new balance. Takes the caller's open transaction so the mutation
/// shares the atomic unit of the operation that justifies it.
pub async fn debit_card(
    tx: &mut Transaction<'_, Postgres>,
    account: &CustomerRef,
    amount: Decimal,
    description: &str,
    reference: &str,
) -> EngineResult<Decimal> {
    let updated: Option<Decimal> = sqlx::query_scalar(
        "UPDATE cards SET balance = balance - $1 WHERE account_id = $2 RETURNING balance",
    )
    .bind(amount)
    .bind(account.account_id)
    .fetch_optional(&mut **tx)
    .await?;
    let new_balance = updated.unwrap_or(Decimal::ZERO - amount);

    append_entry(
        tx,
        &account.email,
        BalanceStore::Card,
        EntryType::Debit,
        -amount,
        description,
        Some(reference),
    )
    .await?;
    Ok(new_balance)
}

/// Credit the wallet balance (creating the wallet on first use) and record
/// the matching ledger entry. Returns the new balance.
pub async fn credit_wallet(
    tx: &mut Transaction<'_, Postgres>,
    account: &CustomerRef,
    amount: Decimal,
    description: &str,
    reference: Option<&str>,
) -> EngineResult<Decimal> {
    let new_balance: Decimal = sqlx::query_scalar(
        r#"
        INSERT INTO wallets (account_email, account_id, balance, updated_at)
        VALUES ($1, $2, $3, NOW())
        ON CONFLICT (account_email) DO UPDATE
            SET balance = wallets.balance + EXCLUDED.balance, updated_at = NOW()
        RETURNING balance
        "#,
    )
    .bind(&account.email)
    .bind(account.account_id)
    .bind(amount)
    .fetch_one(&mut **tx)
    .await?;

    append_entry(
        tx,
        &account.email,
        BalanceStore::Wallet,
        EntryType::Credit,
        amount,
        description,
        reference,
    )
    .await?;
    Ok(new_balance)
}

/// Read side of the balance ledger.
#[derive(Clone)]
pub struct BalanceLedger {
    pool: PgPool,
}

impl BalanceLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn wallet_balance(&self, account_email: &str) -> EngineResult<Decimal> {
        let balance: Option<Decimal> = sqlx::query_scalar(
            "SELECT balance FROM wallets WHERE LOWER(account_email) = LOWER($1)",
        )
        .bind(account_email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(balance.unwrap_or(Decimal::ZERO))
    }

    pub async fn recent_entries(
        &self,
        account_email: &str,
        limit: i64,
    ) -> EngineResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT * FROM ledger_entries
            WHERE LOWER(account_email) = LOWER($1)
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(account_email)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

/// Wallet top-ups: verify the payment reference with the gateway first,
/// then apply the credit and its audit rows in one transaction.
#[derive(Clone)]
pub struct WalletService {
    pool: PgPool,
    gateway: Arc<dyn PaymentVerifier>,
}

impl WalletService {
    pub fn new(pool: PgPool, gateway: Arc<dyn PaymentVerifier>) -> Self {
        Self { pool, gateway }
    }

    /// Confirm a top-up for a gateway payment reference. Nothing is
    /// written unless the gateway reports success.
    pub async fn confirm_top_up(
        &self,
        account: &CustomerRef,
        reference: &str,
    ) -> EngineResult<Decimal> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(EngineError::Validation("Missing reference".to_string()));
        }

        let verification = self.gateway.verify(reference).await?;
        if !verification.succeeded {
            return Err(EngineError::PaymentNotVerified {
                reference: reference.to_string(),
            });
        }
        let amount = Decimal::new(verification.amount_minor, 2);

        let mut tx = self.pool.begin().await?;
        let new_balance = credit_wallet(
            &mut tx,
            account,
            amount,
            "Wallet top-up via payment gateway",
            Some(reference),
        )
        .await
        .map_err(|e| match e {
            EngineError::Database(db) if is_unique_violation(&db) => {
                EngineError::Conflict("This top-up reference was already applied".to_string())
            }
            other => other,
        })?;

        sqlx::query(
            r#"
            INSERT INTO top_ups (
                id, account_email, account_name, amount, status, reference,
                balance_after, created_at
            ) VALUES ($1, $2, $3, $4, 'success', $5, $6, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.email)
        .bind(&account.name)
        .bind(amount)
        .bind(reference)
        .bind(new_balance)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        info!(
            account = %account.email,
            %amount,
            reference,
            "wallet top-up confirmed"
        );
        Ok(new_balance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_reference_carries_prefix_and_short_id() {
        let reference = ledger_reference("benefit");
        assert!(reference.starts_with("benefit_"));
        assert_eq!(reference.len(), "benefit_".len() + 8);
    }

    #[test]
    fn ledger_references_are_unique() {
        assert_ne!(ledger_reference("topup"), ledger_reference("topup"));
    }
}
