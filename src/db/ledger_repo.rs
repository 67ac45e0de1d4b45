// src/db/ledger_repo.rs

use serde_json::Value;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    models::ledger::{PointTransactionKind, PointsBalance, PointsTransaction},
};

#[derive(Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Garante que a linha de saldo existe (clientes antigos criados antes
    // do saldo materializado, importação em massa, etc).
    pub async fn ensure_balance_row<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO points_balances (tenant_id, customer_id)
            VALUES ($1, $2)
            ON CONFLICT (tenant_id, customer_id) DO NOTHING
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    // O ponto de serialização por cliente: o FOR UPDATE segura a linha de
    // saldo até o commit, então dois débitos concorrentes nunca passam juntos.
    pub async fn lock_balance<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> Result<PointsBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, PointsBalance>(
            r#"
            SELECT * FROM points_balances
            WHERE tenant_id = $1 AND customer_id = $2
            FOR UPDATE
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .fetch_optional(executor)
        .await?;

        balance.ok_or(AppError::NotFound("Saldo de pontos"))
    }

    pub async fn insert_transaction<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
        kind: PointTransactionKind,
        points: i64,
        description: &str,
        metadata: &Value,
    ) -> Result<PointsTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction = sqlx::query_as::<_, PointsTransaction>(
            r#"
            INSERT INTO points_transactions (tenant_id, customer_id, kind, points, description, metadata)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .bind(kind)
        .bind(points)
        .bind(description)
        .bind(metadata)
        .fetch_one(executor)
        .await?;

        Ok(transaction)
    }

    // Aplica o lançamento no saldo materializado. Créditos acumulam em
    // total_earned, débitos em total_redeemed — o CHECK do banco garante
    // que current = earned - redeemed continua de pé.
    pub async fn apply_to_balance<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
        points: i64,
    ) -> Result<PointsBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, PointsBalance>(
            r#"
            UPDATE points_balances
            SET current_balance = current_balance + $3,
                total_earned = total_earned + GREATEST($3, 0),
                total_redeemed = total_redeemed + GREATEST(-$3, 0)
            WHERE tenant_id = $1 AND customer_id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .bind(points)
        .fetch_one(executor)
        .await?;

        Ok(balance)
    }

    pub async fn get_balance<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> Result<PointsBalance, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_as::<_, PointsBalance>(
            "SELECT * FROM points_balances WHERE tenant_id = $1 AND customer_id = $2",
        )
        .bind(tenant_id)
        .bind(customer_id)
        .fetch_optional(executor)
        .await?;

        // Cliente sem linha de saldo ainda = saldo zerado
        Ok(balance.unwrap_or(PointsBalance {
            tenant_id,
            customer_id,
            current_balance: 0,
            total_earned: 0,
            total_redeemed: 0,
        }))
    }

    // Extrato do cliente, mais recente primeiro
    pub async fn list_transactions(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        params: &PageParams,
    ) -> Result<Vec<PointsTransaction>, AppError> {
        let transactions = sqlx::query_as::<_, PointsTransaction>(
            r#"
            SELECT * FROM points_transactions
            WHERE tenant_id = $1 AND customer_id = $2
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    pub async fn count_transactions(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM points_transactions WHERE tenant_id = $1 AND customer_id = $2",
        )
        .bind(tenant_id)
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}
