// src/db/customer_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    models::customer::Customer,
};

#[derive(Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        phone: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        opted_in: bool,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (tenant_id, phone, first_name, last_name, opted_in, opted_in_at)
            VALUES ($1, $2, $3, $4, $5, CASE WHEN $5 THEN NOW() ELSE NULL END)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(phone)
        .bind(first_name)
        .bind(last_name)
        .bind(opted_in)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                // (tenant_id, phone) é único
                if db_err.is_unique_violation() {
                    return AppError::InvalidInput(
                        "Já existe um cliente com este telefone.".to_string(),
                    );
                }
            }
            AppError::DatabaseError(e)
        })
    }

    pub async fn find_by_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL",
        )
        .bind(tenant_id)
        .bind(customer_id)
        .fetch_optional(executor)
        .await?;

        customer.ok_or(AppError::NotFound("Cliente"))
    }

    // Versão sem filtro de soft-delete: o despachante de notificações
    // ainda precisa achar o telefone de um cliente já removido.
    pub async fn find_by_id_any(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
    ) -> Result<Customer, AppError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT * FROM customers WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        customer.ok_or(AppError::NotFound("Cliente"))
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        params: &PageParams,
    ) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM customers
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

        Ok(customers)
    }

    pub async fn count(&self, tenant_id: Uuid) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM customers WHERE tenant_id = $1 AND deleted_at IS NULL",
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    // Bloqueio/desbloqueio. Não mexe em nada do histórico do ledger.
    pub async fn set_blocked<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_id: Uuid,
        blocked: bool,
        reason: Option<&str>,
    ) -> Result<Customer, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers
            SET loyalty_status = CASE WHEN $3 THEN 'blocked'::loyalty_status ELSE 'active'::loyalty_status END,
                block_reason = CASE WHEN $3 THEN $4 ELSE NULL END,
                updated_at = NOW()
            WHERE tenant_id = $1 AND id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(customer_id)
        .bind(blocked)
        .bind(reason)
        .fetch_optional(executor)
        .await?;

        customer.ok_or(AppError::NotFound("Cliente"))
    }
}
