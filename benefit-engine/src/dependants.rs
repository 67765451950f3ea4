use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{is_unique_violation, EngineError, EngineResult};
use crate::models::{CustomerRef, DependantLink, SponsorRef};

/// Directory of sponsor -> dependant delegation links.
///
/// Uniqueness of the (sponsor, dependant) pair and the single-sponsor rule
/// are both enforced by database constraints, not just by query shape.
#[derive(Clone)]
pub struct DependantDirectory {
    pool: PgPool,
}

impl DependantDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register `dependant_email` as a dependant of the sponsor.
    pub async fn add_link(
        &self,
        sponsor: &CustomerRef,
        dependant_email: &str,
    ) -> EngineResult<DependantLink> {
        let dependant_email = dependant_email.trim();
        if dependant_email.is_empty() {
            return Err(EngineError::Validation(
                "Dependant email is required".to_string(),
            ));
        }
        if dependant_email.eq_ignore_ascii_case(&sponsor.email) {
            return Err(EngineError::Validation(
                "You can't add yourself as a dependant".to_string(),
            ));
        }

        let dependant: Option<(Uuid, String, String)> = sqlx::query_as(
            "SELECT id, email, display_name FROM accounts WHERE LOWER(email) = LOWER($1)",
        )
        .bind(dependant_email)
        .fetch_optional(&self.pool)
        .await?;

        let Some((dependant_id, dependant_email, dependant_name)) = dependant else {
            return Err(EngineError::NotFound { resource: "account" });
        };

        let link = sqlx::query_as::<_, DependantLink>(
            r#"
            INSERT INTO dependant_links (
                id, sponsor_id, sponsor_email, sponsor_name,
                dependant_id, dependant_email, dependant_name, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, NOW())
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(sponsor.account_id)
        .bind(&sponsor.email)
        .bind(&sponsor.name)
        .bind(dependant_id)
        .bind(&dependant_email)
        .bind(&dependant_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                EngineError::Conflict(
                    "This person is already registered as a dependant".to_string(),
                )
            } else {
                EngineError::Database(e)
            }
        })?;

        info!(
            sponsor = %sponsor.email,
            dependant = %link.dependant_email,
            "dependant link created"
        );
        Ok(link)
    }

    /// Remove the link owned by `sponsor_id` for `dependant_id`.
    pub async fn remove_link(&self, sponsor_id: Uuid, dependant_id: Uuid) -> EngineResult<()> {
        let result = sqlx::query(
            "DELETE FROM dependant_links WHERE sponsor_id = $1 AND dependant_id = $2",
        )
        .bind(sponsor_id)
        .bind(dependant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(EngineError::NotFound {
                resource: "dependant link",
            });
        }
        Ok(())
    }

    /// The lookup the eligibility resolver depends on. At most one row can
    /// match thanks to the unique index on dependant email.
    pub async fn find_sponsor_for(
        &self,
        dependant_email: &str,
    ) -> EngineResult<Option<SponsorRef>> {
        let sponsor = sqlx::query_as::<_, SponsorRef>(
            r#"
            SELECT sponsor_id, sponsor_email, sponsor_name
            FROM dependant_links
            WHERE LOWER(dependant_email) = LOWER($1)
            "#,
        )
        .bind(dependant_email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(sponsor)
    }

    pub async fn list_for_sponsor(&self, sponsor_id: Uuid) -> EngineResult<Vec<DependantLink>> {
        let links = sqlx::query_as::<_, DependantLink>(
            "SELECT * FROM dependant_links WHERE sponsor_id = $1 ORDER BY created_at DESC",
        )
        .bind(sponsor_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(links)
    }

    pub async fn is_dependant(&self, email: &str) -> EngineResult<bool> {
        Ok(self.find_sponsor_for(email).await?.is_some())
    }
}
