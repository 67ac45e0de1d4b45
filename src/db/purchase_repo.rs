// src/db/purchase_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    models::purchase::{Purchase, PurchaseSource},
};

#[derive(Clone)]
pub struct PurchaseRepository {
    pool: PgPool,
}

impl PurchaseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
        amount_minor: i64,
        description: Option<&str>,
        channel: Option<&str>,
        purchase_date: DateTime<Utc>,
        points_awarded: i64,
        source: PurchaseSource,
    ) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases
                (tenant_id, customer_id, amount_minor, description, channel, purchase_date, points_awarded, source)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .bind(amount_minor)
        .bind(description)
        .bind(channel)
        .bind(purchase_date)
        .bind(points_awarded)
        .bind(source)
        .fetch_one(executor)
        .await?;

        Ok(purchase)
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        customer_id: Option<Uuid>,
        params: &PageParams,
    ) -> Result<Vec<Purchase>, AppError> {
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT * FROM purchases
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR customer_id = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(purchases)
    }

    pub async fn count(
        &self,
        tenant_id: Uuid,
        customer_id: Option<Uuid>,
    ) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM purchases
            WHERE tenant_id = $1 AND ($2::uuid IS NULL OR customer_id = $2)
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
