// src/db/claim_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    models::claim::{ClaimStatus, FraudFlag, PurchaseClaim},
};

// Linha agregada usada pelas heurísticas de fraude.
// COUNT() chega como BIGINT, AVG() como NUMERIC (Decimal).
#[derive(Debug, sqlx::FromRow)]
pub struct ClaimStatsRow {
    pub total_claims: i64,
    pub rejected_claims: i64,
    pub avg_purchase_amount_minor: Option<Decimal>,
    pub same_amount_recent: i64,
}

#[derive(Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

impl ClaimRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
        amount_minor: i64,
        channel: Option<&str>,
        receipt_url: Option<&str>,
        description: Option<&str>,
        fraud_flags: &[FraudFlag],
        expires_at: DateTime<Utc>,
    ) -> Result<PurchaseClaim, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let claim = sqlx::query_as::<_, PurchaseClaim>(
            r#"
            INSERT INTO purchase_claims
                (tenant_id, customer_id, amount_minor, channel, receipt_url, description, fraud_flags, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .bind(amount_minor)
        .bind(channel)
        .bind(receipt_url)
        .bind(description)
        .bind(fraud_flags)
        .bind(expires_at)
        .fetch_one(executor)
        .await?;

        Ok(claim)
    }

    // Trava a linha da claim: a revisão concorrente espera aqui e depois
    // encontra o status já alterado (AlreadyReviewed).
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        claim_id: Uuid,
    ) -> Result<PurchaseClaim, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let claim = sqlx::query_as::<_, PurchaseClaim>(
            "SELECT * FROM purchase_claims WHERE tenant_id = $1 AND id = $2 FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(claim_id)
        .fetch_optional(executor)
        .await?;

        claim.ok_or(AppError::NotFound("Reivindicação"))
    }

    pub async fn mark_approved<'e, E>(
        &self,
        executor: E,
        claim_id: Uuid,
        purchase_id: Uuid,
    ) -> Result<PurchaseClaim, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let claim = sqlx::query_as::<_, PurchaseClaim>(
            r#"
            UPDATE purchase_claims
            SET status = 'approved', purchase_id = $2, reviewed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(claim_id)
        .bind(purchase_id)
        .fetch_one(executor)
        .await?;

        Ok(claim)
    }

    pub async fn mark_rejected<'e, E>(
        &self,
        executor: E,
        claim_id: Uuid,
        rejection_reason: &str,
    ) -> Result<PurchaseClaim, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let claim = sqlx::query_as::<_, PurchaseClaim>(
            r#"
            UPDATE purchase_claims
            SET status = 'rejected', rejection_reason = $2, reviewed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(claim_id)
        .bind(rejection_reason)
        .fetch_one(executor)
        .await?;

        Ok(claim)
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<ClaimStatus>,
        params: &PageParams,
    ) -> Result<Vec<PurchaseClaim>, AppError> {
        let claims = sqlx::query_as::<_, PurchaseClaim>(
            r#"
            SELECT * FROM purchase_claims
            WHERE tenant_id = $1 AND ($2::claim_status IS NULL OR status = $2)
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

        Ok(claims)
    }

    pub async fn count(
        &self,
        tenant_id: Uuid,
        status: Option<ClaimStatus>,
    ) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM purchase_claims
            WHERE tenant_id = $1 AND ($2::claim_status IS NULL OR status = $2)
            "#,
        )
        .bind(tenant_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    // Varredura: claims pendentes vencidas viram 'expired'.
    // Sem efeito no ledger (nenhum ponto foi reservado por uma claim).
    pub async fn expire_due(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE purchase_claims
            SET status = 'expired'
            WHERE status = 'pending' AND expires_at <= $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    // Histórico agregado do cliente para as heurísticas de fraude
    pub async fn stats_for_customer(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        amount_minor: i64,
        repeated_window_days: i32,
    ) -> Result<ClaimStatsRow, AppError> {
        let stats = sqlx::query_as::<_, ClaimStatsRow>(
            r#"
            SELECT
                COUNT(*) AS total_claims,
                COUNT(*) FILTER (WHERE status = 'rejected') AS rejected_claims,
                (SELECT AVG(p.amount_minor) FROM purchases p
                  WHERE p.tenant_id = $1 AND p.customer_id = $2) AS avg_purchase_amount_minor,
                COUNT(*) FILTER (
                    WHERE amount_minor = $3
                      AND created_at > NOW() - make_interval(days => $4)
                ) AS same_amount_recent
            FROM purchase_claims
            WHERE tenant_id = $1 AND customer_id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .bind(amount_minor)
        .bind(repeated_window_days)
        .fetch_one(&self.pool)
        .await?;

        Ok(stats)
    }
}
