// src/services/purchase_service.rs

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::{PageParams, Paginated},
    db::{CustomerRepository, OutboxRepository, PurchaseRepository, TenantRepository},
    models::{
        ledger::PointTransactionKind,
        purchase::{Purchase, PurchaseSource},
    },
    services::{earn_rate, ledger_service::LedgerService},
};

#[derive(Clone)]
pub struct PurchaseService {
    purchase_repo: PurchaseRepository,
    customer_repo: CustomerRepository,
    tenant_repo: TenantRepository,
    outbox_repo: OutboxRepository,
    ledger: LedgerService,
    pool: PgPool,
}

impl PurchaseService {
    pub fn new(
        purchase_repo: PurchaseRepository,
        customer_repo: CustomerRepository,
        tenant_repo: TenantRepository,
        outbox_repo: OutboxRepository,
        ledger: LedgerService,
        pool: PgPool,
    ) -> Self {
        Self { purchase_repo, customer_repo, tenant_repo, outbox_repo, ledger, pool }
    }

    /// Registra uma venda confirmada pelo vendedor. Os pontos são SEMPRE
    /// recalculados aqui a partir do valor canônico em unidades menores —
    /// o preview do dashboard é só cosmético.
    pub async fn log_purchase(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        amount_minor: i64,
        description: Option<&str>,
        channel: Option<&str>,
        purchase_date: Option<DateTime<Utc>>,
    ) -> Result<Purchase, AppError> {
        if amount_minor <= 0 {
            return Err(AppError::InvalidInput(
                "O valor da compra deve ser maior que zero.".to_string(),
            ));
        }

        let settings = self.tenant_repo.get_settings(&self.pool, tenant_id).await?;
        let customer = self
            .customer_repo
            .find_by_id(&self.pool, tenant_id, customer_id)
            .await?;

        // Cliente bloqueado: a compra é registrada (auditoria), mas com
        // zero pontos.
        let points = if customer.can_accrue_points() {
            earn_rate::points_for_amount(settings.home_currency, amount_minor)
        } else {
            0
        };

        let purchase_date = purchase_date.unwrap_or_else(Utc::now);

        let mut tx = self.pool.begin().await?;

        let purchase = self
            .purchase_repo
            .create(
                &mut *tx,
                tenant_id,
                customer_id,
                amount_minor,
                description,
                channel,
                purchase_date,
                points,
                PurchaseSource::Vendor,
            )
            .await?;

        if points > 0 {
            self.ledger
                .record(
                    &mut *tx,
                    tenant_id,
                    customer_id,
                    PointTransactionKind::Earned,
                    points,
                    "Pontos da compra",
                    json!({ "purchaseId": purchase.id }),
                )
                .await?;
        }

        self.outbox_repo
            .enqueue(
                &mut *tx,
                tenant_id,
                customer_id,
                "purchase_logged",
                &json!({
                    "purchaseId": purchase.id,
                    "amountMinor": amount_minor,
                    "pointsAwarded": points,
                }),
            )
            .await?;

        tx.commit().await?;

        Ok(purchase)
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        customer_id: Option<Uuid>,
        params: &PageParams,
    ) -> Result<Paginated<Purchase>, AppError> {
        let purchases = self.purchase_repo.list(tenant_id, customer_id, params).await?;
        let total = self.purchase_repo.count(tenant_id, customer_id).await?;

        Ok(Paginated::new(purchases, total, params))
    }
}
