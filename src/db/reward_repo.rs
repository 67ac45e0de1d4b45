// src/db/reward_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    models::reward::Reward,
};

#[derive(Clone)]
pub struct RewardRepository {
    pool: PgPool,
}

impl RewardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        description: Option<&str>,
        points_required: i64,
        value_minor: Option<i64>,
        is_active: bool,
        stock_quantity: Option<i32>,
        max_per_customer: Option<i32>,
        valid_from: Option<DateTime<Utc>>,
        valid_until: Option<DateTime<Utc>>,
        terms: Option<&str>,
    ) -> Result<Reward, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            INSERT INTO rewards
                (tenant_id, name, description, points_required, value_minor, is_active,
                 stock_quantity, max_per_customer, valid_from, valid_until, terms)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(description)
        .bind(points_required)
        .bind(value_minor)
        .bind(is_active)
        .bind(stock_quantity)
        .bind(max_per_customer)
        .bind(valid_from)
        .bind(valid_until)
        .bind(terms)
        .fetch_one(executor)
        .await?;

        Ok(reward)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        reward_id: Uuid,
        name: &str,
        description: Option<&str>,
        points_required: i64,
        value_minor: Option<i64>,
        is_active: bool,
        stock_quantity: Option<i32>,
        max_per_customer: Option<i32>,
        valid_from: Option<DateTime<Utc>>,
        valid_until: Option<DateTime<Utc>>,
        terms: Option<&str>,
    ) -> Result<Reward, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reward = sqlx::query_as::<_, Reward>(
            r#"
            UPDATE rewards SET
                name = $3, description = $4, points_required = $5, value_minor = $6,
                is_active = $7, stock_quantity = $8, max_per_customer = $9,
                valid_from = $10, valid_until = $11, terms = $12, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(reward_id)
        .bind(name)
        .bind(description)
        .bind(points_required)
        .bind(value_minor)
        .bind(is_active)
        .bind(stock_quantity)
        .bind(max_per_customer)
        .bind(valid_from)
        .bind(valid_until)
        .bind(terms)
        .fetch_optional(executor)
        .await?;

        reward.ok_or(AppError::NotFound("Recompensa"))
    }

    // Soft delete: a recompensa some do catálogo mas os resgates antigos
    // continuam apontando para ela.
    pub async fn soft_delete<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        reward_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE rewards SET deleted_at = NOW(), is_active = FALSE, updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(tenant_id)
        .bind(reward_id)
        .execute(executor)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Recompensa"));
        }
        Ok(())
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        reward_id: Uuid,
    ) -> Result<Reward, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reward = sqlx::query_as::<_, Reward>(
            "SELECT * FROM rewards WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id)
        .bind(reward_id)
        .fetch_optional(executor)
        .await?;

        reward.ok_or(AppError::NotFound("Recompensa"))
    }

    // Trava a linha da recompensa durante o resgate: estoque é recurso
    // quente compartilhado e só pode mudar aqui dentro.
    pub async fn find_for_update<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        reward_id: Uuid,
    ) -> Result<Reward, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reward = sqlx::query_as::<_, Reward>(
            "SELECT * FROM rewards WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(tenant_id)
        .bind(reward_id)
        .fetch_optional(executor)
        .await?;

        reward.ok_or(AppError::NotFound("Recompensa"))
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        params: &PageParams,
    ) -> Result<Vec<Reward>, AppError> {
        let rewards = sqlx::query_as::<_, Reward>(
            r#"
            SELECT * FROM rewards
            WHERE tenant_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(tenant_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(rewards)
    }

    pub async fn count(&self, tenant_id: Uuid) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM rewards WHERE tenant_id = $1 AND deleted_at IS NULL",
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    // Decremento condicional: só passa se ainda houver estoque (ou se for
    // ilimitado). rows_affected() == 0 significa estoque esgotado.
    pub async fn decrement_stock<'e, E>(
        &self,
        executor: E,
        reward_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE rewards
            SET stock_quantity = stock_quantity - 1, updated_at = NOW()
            WHERE id = $1 AND stock_quantity IS NOT NULL AND stock_quantity > 0
            "#,
        )
        .bind(reward_id)
        .execute(executor)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // Devolve o estoque quando um resgate é cancelado/expira
    pub async fn increment_stock<'e, E>(
        &self,
        executor: E,
        reward_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE rewards
            SET stock_quantity = stock_quantity + 1, updated_at = NOW()
            WHERE id = $1 AND stock_quantity IS NOT NULL
            "#,
        )
        .bind(reward_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    // Resgates que contam para o limite por cliente: pendentes + fulfillados.
    // Cancelados/expirados devolvem a "vaga".
    pub async fn count_customer_redemptions<'e, E>(
        &self,
        executor: E,
        reward_id: Uuid,
        customer_id: Uuid,
    ) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM redemptions
            WHERE reward_id = $1 AND customer_id = $2
              AND status IN ('pending', 'fulfilled')
            "#,
        )
        .bind(reward_id)
        .bind(customer_id)
        .fetch_one(executor)
        .await?;

        Ok(count)
    }
}
