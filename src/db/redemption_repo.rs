// src/db/redemption_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    models::redemption::{Redemption, RedemptionStatus},
};

#[derive(Clone)]
pub struct RedemptionRepository {
    pool: PgPool,
}

impl RedemptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Retorna None em violação de unicidade do código, para o serviço
    // gerar outro e tentar de novo (nunca vaza Conflict para o caller).
    pub async fn try_create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        reward_id: Uuid,
        customer_id: Uuid,
        code: &str,
        points_used: i64,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<Redemption>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query_as::<_, Redemption>(
            r#"
            INSERT INTO redemptions
                (tenant_id, reward_id, customer_id, code, points_used, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(reward_id)
        .bind(customer_id)
        .bind(code)
        .bind(points_used)
        .bind(expires_at)
        .fetch_one(executor)
        .await;

        match result {
            Ok(redemption) => Ok(Some(redemption)),
            Err(e) => {
                if let Some(db_err) = e.as_database_error() {
                    if db_err.is_unique_violation() {
                        return Ok(None);
                    }
                }
                Err(AppError::DatabaseError(e))
            }
        }
    }

    pub async fn find_by_code_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        code: &str,
    ) -> Result<Redemption, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let redemption = sqlx::query_as::<_, Redemption>(
            "SELECT * FROM redemptions WHERE tenant_id = $1 AND code = $2 FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(code)
        .fetch_optional(executor)
        .await?;

        redemption.ok_or(AppError::NotFound("Resgate"))
    }

    pub async fn find_by_id_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        redemption_id: Uuid,
    ) -> Result<Redemption, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let redemption = sqlx::query_as::<_, Redemption>(
            "SELECT * FROM redemptions WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(redemption_id)
        .fetch_optional(executor)
        .await?;

        redemption.ok_or(AppError::NotFound("Resgate"))
    }

    pub async fn mark_fulfilled<'e, E>(
        &self,
        executor: E,
        redemption_id: Uuid,
        notes: Option<&str>,
    ) -> Result<Redemption, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let redemption = sqlx::query_as::<_, Redemption>(
            r#"
            UPDATE redemptions
            SET status = 'fulfilled', notes = $2, fulfilled_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(redemption_id)
        .bind(notes)
        .fetch_one(executor)
        .await?;

        Ok(redemption)
    }

    // Serve tanto para 'cancelled' (manual) quanto 'expired' (varredura):
    // os dois caminhos são o mesmo estorno.
    pub async fn mark_closed<'e, E>(
        &self,
        executor: E,
        redemption_id: Uuid,
        status: RedemptionStatus,
        reason: Option<&str>,
    ) -> Result<Redemption, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let redemption = sqlx::query_as::<_, Redemption>(
            r#"
            UPDATE redemptions
            SET status = $2, cancellation_reason = $3, cancelled_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(redemption_id)
        .bind(status)
        .bind(reason)
        .fetch_one(executor)
        .await?;

        Ok(redemption)
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<RedemptionStatus>,
        params: &PageParams,
    ) -> Result<Vec<Redemption>, AppError> {
        let redemptions = sqlx::query_as::<_, Redemption>(
            r#"
            SELECT * FROM redemptions
            WHERE tenant_id = $1 AND ($2::redemption_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(redemptions)
    }

    pub async fn count(
        &self,
        tenant_id: Uuid,
        status: Option<RedemptionStatus>,
    ) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM redemptions
            WHERE tenant_id = $1 AND ($2::redemption_status IS NULL OR status = $2)
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    // IDs dos resgates pendentes vencidos. A varredura processa um a um,
    // cada um na sua transação, re-checando o status sob lock.
    pub async fn find_due_expiry(
        &self,
        now: DateTime<Utc>,
        batch: i64,
    ) -> Result<Vec<(Uuid, Uuid)>, AppError> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid)>(
            r#"
            SELECT tenant_id, id FROM redemptions
            WHERE status = 'pending' AND expires_at <= $1
            ORDER BY expires_at ASC
            LIMIT $2
            "#,
        )
        .bind(now)
        .bind(batch)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
