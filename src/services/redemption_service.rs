// src/services/redemption_service.rs

use chrono::{Duration, Utc};
use rand::Rng;
use serde_json::json;
use sqlx::{Acquire, PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::{PageParams, Paginated},
    db::{CustomerRepository, OutboxRepository, RedemptionRepository, RewardRepository},
    models::{
        ledger::PointTransactionKind,
        redemption::{Redemption, RedemptionStatus},
    },
    services::{ledger_service::LedgerService, reward_service::RewardService},
};

// Validade da reserva: depois disso o resgate expira e os pontos voltam
const REDEMPTION_TTL_HOURS: i64 = 24;

// Sem 0/O/1/I para o vendedor não se confundir ao digitar o código
const CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 8;
const CODE_MAX_ATTEMPTS: usize = 5;

pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..CODE_CHARSET.len());
            CODE_CHARSET[idx] as char
        })
        .collect()
}

#[derive(Clone)]
pub struct RedemptionService {
    redemption_repo: RedemptionRepository,
    reward_repo: RewardRepository,
    customer_repo: CustomerRepository,
    outbox_repo: OutboxRepository,
    ledger: LedgerService,
    pool: PgPool,
}

impl RedemptionService {
    pub fn new(
        redemption_repo: RedemptionRepository,
        reward_repo: RewardRepository,
        customer_repo: CustomerRepository,
        outbox_repo: OutboxRepository,
        ledger: LedgerService,
        pool: PgPool,
    ) -> Self {
        Self { redemption_repo, reward_repo, customer_repo, outbox_repo, ledger, pool }
    }

    /// Cria um resgate: trava a recompensa, valida elegibilidade, baixa o
    /// estoque, DEBITA os pontos (reserva) e emite o código — uma única
    /// transação. Se qualquer passo falhar, nada fica pela metade.
    pub async fn redeem(
        &self,
        tenant_id: Uuid,
        customer_id: Uuid,
        reward_id: Uuid,
    ) -> Result<Redemption, AppError> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        // Estoque é recurso quente: a linha fica travada até o commit
        let reward = self
            .reward_repo
            .find_for_update(&mut *tx, tenant_id, reward_id)
            .await?;

        let already = self
            .reward_repo
            .count_customer_redemptions(&mut *tx, reward_id, customer_id)
            .await?;

        RewardService::check_eligibility(&reward, now, already)?;

        self.customer_repo
            .find_by_id(&mut *tx, tenant_id, customer_id)
            .await?;

        if reward.stock_quantity.is_some() {
            let decremented = self.reward_repo.decrement_stock(&mut *tx, reward_id).await?;
            if !decremented {
                // Não deveria acontecer com a linha travada, mas o contrato
                // do estoque nunca confia no chamador.
                return Err(AppError::RewardUnavailable);
            }
        }

        // Violação de unicidade do código é resolvida aqui dentro com um
        // novo código — Conflict nunca chega ao caller. Cada tentativa roda
        // num savepoint: o INSERT rejeitado não pode abortar a transação
        // externa inteira.
        let mut redemption = None;
        for _ in 0..CODE_MAX_ATTEMPTS {
            let code = generate_code();
            let mut attempt = tx.begin().await?;
            if let Some(created) = self
                .redemption_repo
                .try_create(
                    &mut *attempt,
                    tenant_id,
                    reward_id,
                    customer_id,
                    &code,
                    reward.points_required,
                    now + Duration::hours(REDEMPTION_TTL_HOURS),
                )
                .await?
            {
                attempt.commit().await?;
                redemption = Some(created);
                break;
            }
            // código colidiu: o drop do savepoint desfaz só esta tentativa
        }
        let redemption = redemption.ok_or_else(|| {
            anyhow::anyhow!("Não foi possível gerar um código de resgate único")
        })?;

        // Débito-reserva. O piso do ledger derruba a transação inteira se
        // o saldo não cobrir (estoque volta junto no rollback).
        self.ledger
            .record(
                &mut *tx,
                tenant_id,
                customer_id,
                PointTransactionKind::Redeemed,
                -reward.points_required,
                &format!("Resgate: {}", reward.name),
                json!({ "redemptionId": redemption.id, "rewardId": reward_id }),
            )
            .await?;

        self.outbox_repo
            .enqueue(
                &mut *tx,
                tenant_id,
                customer_id,
                "redemption_created",
                &json!({
                    "redemptionId": redemption.id,
                    "code": redemption.code.clone(),
                    "reward": reward.name,
                    "pointsUsed": reward.points_required,
                }),
            )
            .await?;

        tx.commit().await?;

        Ok(redemption)
    }

    /// Consulta pelo código para o vendedor confirmar. Idempotente: não
    /// tem efeito colateral em resgates pendentes válidos. Resgate vencido
    /// é expirado preguiçosamente aqui mesmo (com estorno).
    pub async fn verify(&self, tenant_id: Uuid, code: &str) -> Result<Redemption, AppError> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let redemption = self
            .redemption_repo
            .find_by_code_for_update(&mut *tx, tenant_id, code)
            .await?;

        if redemption.is_overdue(now) {
            self.close_and_refund(&mut tx, &redemption, RedemptionStatus::Expired, None)
                .await?;
            tx.commit().await?;
            return Err(Self::state_error(RedemptionStatus::Expired));
        }

        if !redemption.is_actionable(now) {
            return Err(Self::state_error(redemption.status));
        }

        tx.commit().await?;

        Ok(redemption)
    }

    /// pending -> fulfilled. Terminal e irreversível; sem efeito no ledger
    /// (os pontos já saíram na criação).
    pub async fn fulfill(
        &self,
        tenant_id: Uuid,
        redemption_id: Uuid,
        notes: Option<&str>,
    ) -> Result<Redemption, AppError> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let redemption = self
            .redemption_repo
            .find_by_id_for_update(&mut *tx, tenant_id, redemption_id)
            .await?;

        if redemption.is_overdue(now) {
            self.close_and_refund(&mut tx, &redemption, RedemptionStatus::Expired, None)
                .await?;
            tx.commit().await?;
            return Err(Self::state_error(RedemptionStatus::Expired));
        }

        if redemption.status != RedemptionStatus::Pending {
            return Err(Self::state_error(redemption.status));
        }

        let fulfilled = self
            .redemption_repo
            .mark_fulfilled(&mut *tx, redemption_id, notes)
            .await?;

        self.outbox_repo
            .enqueue(
                &mut *tx,
                tenant_id,
                redemption.customer_id,
                "redemption_fulfilled",
                &json!({ "redemptionId": redemption_id, "code": redemption.code.clone() }),
            )
            .await?;

        tx.commit().await?;

        Ok(fulfilled)
    }

    /// pending -> cancelled, com estorno integral dos pontos e devolução
    /// do estoque.
    pub async fn cancel(
        &self,
        tenant_id: Uuid,
        redemption_id: Uuid,
        reason: Option<&str>,
    ) -> Result<Redemption, AppError> {
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let redemption = self
            .redemption_repo
            .find_by_id_for_update(&mut *tx, tenant_id, redemption_id)
            .await?;

        if redemption.is_overdue(now) {
            self.close_and_refund(&mut tx, &redemption, RedemptionStatus::Expired, None)
                .await?;
            tx.commit().await?;
            return Err(Self::state_error(RedemptionStatus::Expired));
        }

        if redemption.status != RedemptionStatus::Pending {
            return Err(Self::state_error(redemption.status));
        }

        let cancelled = self
            .close_and_refund(&mut tx, &redemption, RedemptionStatus::Cancelled, reason)
            .await?;

        tx.commit().await?;

        Ok(cancelled)
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        status: Option<RedemptionStatus>,
        params: &PageParams,
    ) -> Result<Paginated<Redemption>, AppError> {
        let redemptions = self.redemption_repo.list(tenant_id, status, params).await?;
        let total = self.redemption_repo.count(tenant_id, status).await?;

        Ok(Paginated::new(redemptions, total, params))
    }

    /// Varredura periódica: expira resgates pendentes vencidos, um por
    /// transação, re-checando o status sob lock — o caminho preguiçoso do
    /// verify pode ter chegado primeiro, e o estorno nunca sai em dobro.
    pub async fn expire_due(&self, batch: i64) -> Result<u64, AppError> {
        let now = Utc::now();
        let due = self.redemption_repo.find_due_expiry(now, batch).await?;

        let mut expired = 0u64;
        for (tenant_id, redemption_id) in due {
            let mut tx = self.pool.begin().await?;

            let redemption = self
                .redemption_repo
                .find_by_id_for_update(&mut *tx, tenant_id, redemption_id)
                .await?;

            if !redemption.is_overdue(now) {
                continue; // alguém já resolveu este resgate
            }

            self.close_and_refund(&mut tx, &redemption, RedemptionStatus::Expired, None)
                .await?;

            tx.commit().await?;
            expired += 1;
        }

        Ok(expired)
    }

    // ---
    // O fechamento com estorno é um só: cancelamento manual e expiração
    // são o mesmo movimento contábil.
    // ---
    async fn close_and_refund(
        &self,
        conn: &mut PgConnection,
        redemption: &Redemption,
        status: RedemptionStatus,
        reason: Option<&str>,
    ) -> Result<Redemption, AppError> {
        let closed = self
            .redemption_repo
            .mark_closed(&mut *conn, redemption.id, status, reason)
            .await?;

        self.ledger
            .record(
                &mut *conn,
                redemption.tenant_id,
                redemption.customer_id,
                PointTransactionKind::Adjusted,
                redemption.points_used,
                match status {
                    RedemptionStatus::Expired => "Estorno de resgate expirado",
                    _ => "Estorno de resgate cancelado",
                },
                json!({ "redemptionId": redemption.id }),
            )
            .await?;

        self.reward_repo
            .increment_stock(&mut *conn, redemption.reward_id)
            .await?;

        let template = match status {
            RedemptionStatus::Expired => "redemption_expired",
            _ => "redemption_cancelled",
        };
        self.outbox_repo
            .enqueue(
                &mut *conn,
                redemption.tenant_id,
                redemption.customer_id,
                template,
                &json!({
                    "redemptionId": redemption.id,
                    "pointsRefunded": redemption.points_used,
                }),
            )
            .await?;

        Ok(closed)
    }

    fn state_error(status: RedemptionStatus) -> AppError {
        match status {
            RedemptionStatus::Fulfilled => {
                AppError::InvalidStateTransition("este resgate já foi utilizado")
            }
            RedemptionStatus::Cancelled => {
                AppError::InvalidStateTransition("este resgate foi cancelado")
            }
            RedemptionStatus::Expired => {
                AppError::InvalidStateTransition("este resgate expirou")
            }
            RedemptionStatus::Pending => {
                AppError::InvalidStateTransition("resgate ainda pendente")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn codigo_tem_8_caracteres_do_charset() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code.bytes().all(|b| CODE_CHARSET.contains(&b)));
        }
    }

    #[test]
    fn codigo_nao_usa_caracteres_ambiguos() {
        for _ in 0..100 {
            let code = generate_code();
            assert!(!code.contains('0'));
            assert!(!code.contains('O'));
            assert!(!code.contains('1'));
            assert!(!code.contains('I'));
        }
    }

    #[test]
    fn codigos_gerados_variam() {
        // Não é um teste de unicidade global (o banco garante isso), só
        // de que o gerador não está preso num único valor.
        let codes: HashSet<String> = (0..50).map(|_| generate_code()).collect();
        assert!(codes.len() > 1);
    }
}
