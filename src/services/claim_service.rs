// src/services/claim_service.rs

use chrono::{Duration, Utc};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::{PageParams, Paginated},
    db::{ClaimRepository, CustomerRepository, OutboxRepository, PurchaseRepository, TenantRepository},
    models::{
        claim::{ClaimStatus, PurchaseClaim},
        customer::CustomerClaimHistory,
        ledger::PointTransactionKind,
        purchase::PurchaseSource,
    },
    services::{earn_rate, fraud, ledger_service::LedgerService},
};

// Decisão do vendedor na tela de revisão
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

#[derive(Clone)]
pub struct ClaimService {
    claim_repo: ClaimRepository,
    customer_repo: CustomerRepository,
    purchase_repo: PurchaseRepository,
    tenant_repo: TenantRepository,
    outbox_repo: OutboxRepository,
    ledger: LedgerService,
    pool: PgPool,
}

impl ClaimService {
    pub fn new(
        claim_repo: ClaimRepository,
        customer_repo: CustomerRepository,
        purchase_repo: PurchaseRepository,
        tenant_repo: TenantRepository,
        outbox_repo: OutboxRepository,
        ledger: LedgerService,
        pool: PgPool,
    ) -> Self {
        Self { claim_repo, customer_repo, purchase_repo, tenant_repo, outbox_repo, ledger, pool }
    }

    /// Registra uma reivindicação vinda do cliente (bot do WhatsApp ou
    /// dashboard), já com as flags de fraude calculadas e o prazo de
    /// revisão correndo.
    pub async fn submit(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        amount_minor: i64,
        channel: Option<&str>,
        receipt_url: Option<&str>,
        description: Option<&str>,
    ) -> Result<PurchaseClaim, AppError> {
        if amount_minor <= 0 {
            return Err(AppError::InvalidInput(
                "O valor da compra deve ser maior que zero.".to_string(),
            ));
        }

        let now = Utc::now();
        let settings = self.tenant_repo.get_settings(&self.pool, tenant_id).await?;
        let customer = self
            .customer_repo
            .find_by_id(&self.pool, tenant_id, customer_id)
            .await?;

        // Histórico agregado -> flags consultivas
        let thresholds = fraud::FraudThresholds::from(&settings);
        let stats = self
            .claim_repo
            .stats_for_customer(
                tenant_id,
                customer_id,
                amount_minor,
                settings.fraud_repeated_amount_window_days,
            )
            .await?;
        let history = CustomerClaimHistory {
            total_claims: stats.total_claims,
            rejected_claims: stats.rejected_claims,
            avg_approved_amount_minor: stats.avg_purchase_amount_minor,
            same_amount_recent: stats.same_amount_recent,
            enrolled_at: customer.created_at,
        };
        let flags = fraud::score_claim(
            fraud::ClaimInput {
                amount_minor,
                has_receipt: receipt_url.is_some(),
            },
            &history,
            thresholds,
            now,
        );

        let expires_at = now + Duration::hours(settings.claim_expiry_hours as i64);

        let mut tx = self.pool.begin().await?;

        let claim = self
            .claim_repo
            .create(
                &mut *tx,
                tenant_id,
                customer_id,
                amount_minor,
                channel,
                receipt_url,
                description,
                &flags,
                expires_at,
            )
            .await?;

        self.outbox_repo
            .enqueue(
                &mut *tx,
                tenant_id,
                customer_id,
                "claim_received",
                &json!({ "claimId": claim.id, "amountMinor": amount_minor }),
            )
            .await?;

        tx.commit().await?;

        Ok(claim)
    }

    /// Revisão do vendedor. A linha da claim fica travada durante a
    /// transição: de duas revisões concorrentes, exatamente uma vence e a
    /// outra recebe AlreadyReviewed — nunca pontos em dobro.
    pub async fn review(
        &self,
        tenant_id: Uuid,
        claim_id: Uuid,
        action: ReviewAction,
        rejection_reason: Option<&str>,
    ) -> Result<PurchaseClaim, AppError> {
        let now = Utc::now();

        // A rejeição exige motivo; valida antes de abrir transação
        let rejection_reason = match action {
            ReviewAction::Reject => {
                let reason = rejection_reason.map(str::trim).unwrap_or_default();
                if reason.is_empty() {
                    return Err(AppError::InvalidInput(
                        "O motivo da rejeição é obrigatório.".to_string(),
                    ));
                }
                Some(reason.to_string())
            }
            ReviewAction::Approve => None,
        };

        let settings = self.tenant_repo.get_settings(&self.pool, tenant_id).await?;

        let mut tx = self.pool.begin().await?;

        let claim = self
            .claim_repo
            .find_for_update(&mut *tx, tenant_id, claim_id)
            .await?;

        // Vencida ou já decidida: transição não acontece. Claims vencidas
        // contam como não-revisáveis mesmo antes da varredura marcá-las.
        if !claim.is_reviewable(now) {
            return Err(AppError::AlreadyReviewed);
        }

        let reviewed = match action {
            ReviewAction::Approve => {
                let customer = self
                    .customer_repo
                    .find_by_id(&mut *tx, tenant_id, claim.customer_id)
                    .await?;

                // Cliente bloqueado: a compra entra para auditoria, mas com
                // zero pontos — o dashboard avisa o vendedor disso.
                let points = if customer.can_accrue_points() {
                    earn_rate::points_for_amount(settings.home_currency, claim.amount_minor)
                } else {
                    0
                };

                let purchase = self
                    .purchase_repo
                    .create(
                        &mut *tx,
                        tenant_id,
                        claim.customer_id,
                        claim.amount_minor,
                        claim.description.as_deref(),
                        claim.channel.as_deref(),
                        claim.created_at,
                        points,
                        PurchaseSource::Claim,
                    )
                    .await?;

                if points > 0 {
                    self.ledger
                        .record(
                            &mut *tx,
                            tenant_id,
                            claim.customer_id,
                            PointTransactionKind::Earned,
                            points,
                            "Compra reivindicada aprovada",
                            json!({ "claimId": claim.id, "purchaseId": purchase.id }),
                        )
                        .await?;
                }

                let approved = self
                    .claim_repo
                    .mark_approved(&mut *tx, claim.id, purchase.id)
                    .await?;

                self.outbox_repo
                    .enqueue(
                        &mut *tx,
                        tenant_id,
                        claim.customer_id,
                        "claim_approved",
                        &json!({
                            "claimId": claim.id,
                            "pointsAwarded": points,
                        }),
                    )
                    .await?;

                approved
            }
            ReviewAction::Reject => {
                let reason = rejection_reason.as_deref().unwrap_or_default();
                let rejected = self
                    .claim_repo
                    .mark_rejected(&mut *tx, claim.id, reason)
                    .await?;

                self.outbox_repo
                    .enqueue(
                        &mut *tx,
                        tenant_id,
                        claim.customer_id,
                        "claim_rejected",
                        &json!({ "claimId": claim.id, "reason": reason }),
                    )
                    .await?;

                rejected
            }
        };

        // A notificação enfileirada acima sai DEPOIS, pelo despachante;
        // a decisão comita aqui independente da entrega.
        tx.commit().await?;

        Ok(reviewed)
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<ClaimStatus>,
        params: &PageParams,
    ) -> Result<Paginated<PurchaseClaim>, AppError> {
        let claims = self.claim_repo.list(tenant_id, status, params).await?;
        let total = self.claim_repo.count(tenant_id, status).await?;

        Ok(Paginated::new(claims, total, params))
    }

    /// Varredura: claims pendentes vencidas viram 'expired'. Nenhum efeito
    /// no ledger — claim não reserva pontos.
    pub async fn expire_due(&self) -> Result<u64, AppError> {
        self.claim_repo.expire_due(Utc::now()).await
    }
}
