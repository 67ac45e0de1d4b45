// src/services/customer_service.rs

use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::{PageParams, Paginated},
    db::{CustomerRepository, LedgerRepository, TenantRepository},
    models::{
        customer::Customer,
        ledger::PointTransactionKind,
    },
    services::ledger_service::LedgerService,
};

// Sentido do ajuste manual de pontos feito pelo vendedor
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    Add,
    Subtract,
}

#[derive(Clone)]
pub struct CustomerService {
    customer_repo: CustomerRepository,
    ledger_repo: LedgerRepository,
    tenant_repo: TenantRepository,
    ledger: LedgerService,
    pool: PgPool,
}

impl CustomerService {
    pub fn new(
        customer_repo: CustomerRepository,
        ledger_repo: LedgerRepository,
        tenant_repo: TenantRepository,
        ledger: LedgerService,
        pool: PgPool,
    ) -> Self {
        Self { customer_repo, ledger_repo, tenant_repo, ledger, pool }
    }

    /// Cadastra um cliente (adicionado pelo vendedor no dashboard) e, se o
    /// bônus de boas-vindas estiver ligado, já credita os pontos — tudo na
    /// mesma transação.
    pub async fn enroll(
        &self,
        tenant_id: Uuid,
        phone: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
        opted_in: bool,
    ) -> Result<Customer, AppError> {
        let settings = self.tenant_repo.get_settings(&self.pool, tenant_id).await?;

        let mut tx = self.pool.begin().await?;

        let customer = self
            .customer_repo
            .create(&mut *tx, tenant_id, phone, first_name, last_name, opted_in)
            .await?;

        self.ledger_repo
            .ensure_balance_row(&mut *tx, tenant_id, customer.id)
            .await?;

        if settings.welcome_bonus_enabled && settings.welcome_bonus_points > 0 {
            self.ledger
                .record(
                    &mut *tx,
                    tenant_id,
                    customer.id,
                    PointTransactionKind::Earned,
                    settings.welcome_bonus_points,
                    "Bônus de boas-vindas",
                    json!({ "source": "welcome_bonus" }),
                )
                .await?;
        }

        tx.commit().await?;

        Ok(customer)
    }

    pub async fn get(&self, tenant_id: Uuid, customer_id: Uuid) -> Result<Customer, AppError> {
        self.customer_repo
            .find_by_id(&self.pool, tenant_id, customer_id)
            .await
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        params: &PageParams,
    ) -> Result<Paginated<Customer>, AppError> {
        let customers = self.customer_repo.list(tenant_id, params).await?;
        let total = self.customer_repo.count(tenant_id).await?;

        Ok(Paginated::new(customers, total, params))
    }

    /// Ajuste manual de pontos. `subtract` passa pelo mesmo piso do ledger:
    /// nunca deixa o saldo negativo.
    pub async fn adjust_points(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        points: i64,
        adjustment_type: AdjustmentType,
        description: &str,
    ) -> Result<(), AppError> {
        if points <= 0 {
            return Err(AppError::InvalidInput(
                "A quantidade de pontos deve ser maior que zero.".to_string(),
            ));
        }

        // Confirma que o cliente existe e pertence ao tenant
        self.customer_repo
            .find_by_id(&self.pool, tenant_id, customer_id)
            .await?;

        let signed_points = match adjustment_type {
            AdjustmentType::Add => points,
            AdjustmentType::Subtract => -points,
        };

        self.ledger
            .record(
                &self.pool,
                tenant_id,
                customer_id,
                PointTransactionKind::Adjusted,
                signed_points,
                description,
                json!({ "source": "manual_adjustment" }),
            )
            .await?;

        Ok(())
    }

    // Bloqueio corta o ACÚMULO de pontos, não o registro de compras/claims.
    // Nada do histórico é alterado.
    pub async fn set_blocked(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        blocked: bool,
        reason: Option<&str>,
    ) -> Result<Customer, AppError> {
        if blocked && reason.map(|r| r.trim().is_empty()).unwrap_or(true) {
            return Err(AppError::InvalidInput(
                "O motivo do bloqueio é obrigatório.".to_string(),
            ));
        }

        self.customer_repo
            .set_blocked(&self.pool, tenant_id, customer_id, blocked, reason)
            .await
    }
}
