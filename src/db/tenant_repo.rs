// src/db/tenant_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::tenant::{Tenant, TenantSettings, UpdateSettingsRequest},
};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  TENANTS
    // =========================================================================

    pub async fn create_tenant<'e, E>(
        &self,
        executor: E,
        business_name: &str,
        vendor_code: &str,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (business_name, vendor_code)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(business_name)
        .bind(vendor_code)
        .fetch_one(executor)
        .await?;

        Ok(tenant)
    }

    pub async fn find_by_id(&self, tenant_id: Uuid) -> Result<Option<Tenant>, AppError> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "SELECT * FROM tenants WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(tenant)
    }

    // Verifica se o código de adesão já está em uso (ele é único global)
    pub async fn vendor_code_exists(&self, vendor_code: &str) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tenants WHERE vendor_code = $1",
        )
        .bind(vendor_code)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    // =========================================================================
    //  MEMBROS (ponte usuário <-> tenant)
    // =========================================================================

    pub async fn add_member<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO user_tenants (user_id, tenant_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(tenant_id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn is_member(&self, user_id: Uuid, tenant_id: Uuid) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_tenants WHERE user_id = $1 AND tenant_id = $2",
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn get_tenants_for_user(&self, user_id: Uuid) -> Result<Vec<Tenant>, AppError> {
        let tenants = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT t.* FROM tenants t
            JOIN user_tenants ut ON ut.tenant_id = t.id
            WHERE ut.user_id = $1 AND t.deleted_at IS NULL
            ORDER BY t.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tenants)
    }

    // =========================================================================
    //  CONFIGURAÇÕES
    // =========================================================================

    // Cria a linha de configuração com os defaults do banco
    pub async fn create_default_settings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<TenantSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, TenantSettings>(
            "INSERT INTO tenant_settings (tenant_id) VALUES ($1) RETURNING *",
        )
        .bind(tenant_id)
        .fetch_one(executor)
        .await?;

        Ok(settings)
    }

    pub async fn get_settings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<TenantSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, TenantSettings>(
            "SELECT * FROM tenant_settings WHERE tenant_id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(executor)
        .await?;

        settings.ok_or(AppError::NotFound("Configurações do tenant"))
    }

    // UPSERT parcial: COALESCE mantém o valor atual quando o campo não veio
    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        input: &UpdateSettingsRequest,
    ) -> Result<TenantSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, TenantSettings>(
            r#"
            UPDATE tenant_settings SET
                home_currency = COALESCE($2, home_currency),
                welcome_bonus_enabled = COALESCE($3, welcome_bonus_enabled),
                welcome_bonus_points = COALESCE($4, welcome_bonus_points),
                point_value_minor = COALESCE($5, point_value_minor),
                claim_expiry_hours = COALESCE($6, claim_expiry_hours),
                fraud_high_amount_minor = COALESCE($7, fraud_high_amount_minor),
                fraud_new_customer_days = COALESCE($8, fraud_new_customer_days),
                fraud_rejection_rate_pct = COALESCE($9, fraud_rejection_rate_pct),
                fraud_rejection_min_claims = COALESCE($10, fraud_rejection_min_claims),
                fraud_repeated_amount_window_days = COALESCE($11, fraud_repeated_amount_window_days),
                updated_at = NOW()
            WHERE tenant_id = $1
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(input.home_currency)
        .bind(input.welcome_bonus_enabled)
        .bind(input.welcome_bonus_points)
        .bind(input.point_value_minor)
        .bind(input.claim_expiry_hours)
        .bind(input.fraud_high_amount_minor)
        .bind(input.fraud_new_customer_days)
        .bind(input.fraud_rejection_rate_pct)
        .bind(input.fraud_rejection_min_claims)
        .bind(input.fraud_repeated_amount_window_days)
        .fetch_optional(executor)
        .await?;

        settings.ok_or(AppError::NotFound("Configurações do tenant"))
    }
}
