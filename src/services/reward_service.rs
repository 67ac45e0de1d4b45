// src/services/reward_service.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::{PageParams, Paginated},
    db::RewardRepository,
    models::reward::Reward,
};

// Campos aceitos na criação/edição de uma recompensa (o handler valida a
// forma; o serviço valida as regras).
#[derive(Debug, Clone)]
pub struct RewardInput {
    pub name: String,
    pub description: Option<String>,
    pub points_required: i64,
    pub value_minor: Option<i64>,
    pub is_active: bool,
    pub stock_quantity: Option<i32>,
    pub max_per_customer: Option<i32>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub terms: Option<String>,
}

#[derive(Clone)]
pub struct RewardService {
    reward_repo: RewardRepository,
    pool: PgPool,
}

impl RewardService {
    pub fn new(reward_repo: RewardRepository, pool: PgPool) -> Self {
        Self { reward_repo, pool }
    }

    // Regras de negócio do catálogo. O cliente manda sugestões de pontos,
    // mas o servidor NUNCA confia nelas — valida tudo de novo.
    fn validate(input: &RewardInput) -> Result<(), AppError> {
        if input.points_required <= 0 {
            return Err(AppError::InvalidInput(
                "pointsRequired deve ser maior que zero.".to_string(),
            ));
        }
        if let Some(stock) = input.stock_quantity {
            if stock < 0 {
                return Err(AppError::InvalidInput(
                    "stockQuantity não pode ser negativo.".to_string(),
                ));
            }
        }
        if let Some(max) = input.max_per_customer {
            if max < 0 {
                return Err(AppError::InvalidInput(
                    "maxPerCustomer não pode ser negativo.".to_string(),
                ));
            }
        }
        if let (Some(from), Some(until)) = (input.valid_from, input.valid_until) {
            if from > until {
                return Err(AppError::InvalidInput(
                    "validFrom deve ser anterior a validUntil.".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Sugestão de pontos para uma recompensa de valor `value_minor`:
    /// ceil(valor / valor_do_ponto), mínimo 1. Cosmético no dashboard,
    /// recalculado aqui quando solicitado.
    pub fn suggested_points(value_minor: i64, point_value_minor: i64) -> i64 {
        if value_minor <= 0 || point_value_minor <= 0 {
            return 1;
        }
        ((value_minor + point_value_minor - 1) / point_value_minor).max(1)
    }

    /// Elegibilidade para resgate. Chamada pelo RedemptionEngine com a
    /// linha da recompensa já travada.
    pub fn check_eligibility(
        reward: &Reward,
        now: DateTime<Utc>,
        customer_redemption_count: i64,
    ) -> Result<(), AppError> {
        if !reward.is_active || reward.deleted_at.is_some() {
            return Err(AppError::RewardUnavailable);
        }
        if !reward.is_within_validity(now) {
            return Err(AppError::RewardUnavailable);
        }
        if !reward.has_stock() {
            return Err(AppError::RewardUnavailable);
        }
        if let Some(max) = reward.max_per_customer {
            if customer_redemption_count >= max as i64 {
                return Err(AppError::RedemptionLimitReached);
            }
        }
        Ok(())
    }

    pub async fn create(&self, tenant_id: Uuid, input: RewardInput) -> Result<Reward, AppError> {
        Self::validate(&input)?;

        self.reward_repo
            .create(
                &self.pool,
                tenant_id,
                &input.name,
                input.description.as_deref(),
                input.points_required,
                input.value_minor,
                input.is_active,
                input.stock_quantity,
                input.max_per_customer,
                input.valid_from,
                input.valid_until,
                input.terms.as_deref(),
            )
            .await
    }

    pub async fn update(
        &self,
        tenant_id: Uuid,
        reward_id: Uuid,
        input: RewardInput,
    ) -> Result<Reward, AppError> {
        Self::validate(&input)?;

        self.reward_repo
            .update(
                &self.pool,
                tenant_id,
                reward_id,
                &input.name,
                input.description.as_deref(),
                input.points_required,
                input.value_minor,
                input.is_active,
                input.stock_quantity,
                input.max_per_customer,
                input.valid_from,
                input.valid_until,
                input.terms.as_deref(),
            )
            .await
    }

    pub async fn delete(&self, tenant_id: Uuid, reward_id: Uuid) -> Result<(), AppError> {
        self.reward_repo.soft_delete(&self.pool, tenant_id, reward_id).await
    }

    pub async fn get(&self, tenant_id: Uuid, reward_id: Uuid) -> Result<Reward, AppError> {
        self.reward_repo.find_by_id(&self.pool, tenant_id, reward_id).await
    }

    pub async fn list(
        &self,
        tenant_id: Uuid,
        params: &PageParams,
    ) -> Result<Paginated<Reward>, AppError> {
        let rewards = self.reward_repo.list(tenant_id, params).await?;
        let total = self.reward_repo.count(tenant_id).await?;

        Ok(Paginated::new(rewards, total, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn reward() -> Reward {
        let now = Utc::now();
        Reward {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            name: "Brinde".to_string(),
            description: None,
            points_required: 10,
            value_minor: Some(500000),
            is_active: true,
            stock_quantity: Some(5),
            max_per_customer: Some(2),
            valid_from: None,
            valid_until: None,
            terms: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn recompensa_ativa_com_estoque_e_elegivel() {
        assert!(RewardService::check_eligibility(&reward(), Utc::now(), 0).is_ok());
    }

    #[test]
    fn estoque_zerado_rejeita_mesmo_com_saldo() {
        let mut r = reward();
        r.stock_quantity = Some(0);
        let err = RewardService::check_eligibility(&r, Utc::now(), 0).unwrap_err();
        assert!(matches!(err, AppError::RewardUnavailable));
    }

    #[test]
    fn inativa_ou_excluida_rejeita() {
        let mut r = reward();
        r.is_active = false;
        assert!(matches!(
            RewardService::check_eligibility(&r, Utc::now(), 0).unwrap_err(),
            AppError::RewardUnavailable
        ));

        let mut r = reward();
        r.deleted_at = Some(Utc::now());
        assert!(matches!(
            RewardService::check_eligibility(&r, Utc::now(), 0).unwrap_err(),
            AppError::RewardUnavailable
        ));
    }

    #[test]
    fn fora_da_janela_de_validade_rejeita() {
        let mut r = reward();
        r.valid_until = Some(Utc::now() - Duration::days(1));
        assert!(matches!(
            RewardService::check_eligibility(&r, Utc::now(), 0).unwrap_err(),
            AppError::RewardUnavailable
        ));
    }

    #[test]
    fn limite_por_cliente_atingido() {
        let r = reward(); // max_per_customer = 2
        assert!(RewardService::check_eligibility(&r, Utc::now(), 1).is_ok());
        assert!(matches!(
            RewardService::check_eligibility(&r, Utc::now(), 2).unwrap_err(),
            AppError::RedemptionLimitReached
        ));
    }

    #[test]
    fn limite_nulo_e_ilimitado() {
        let mut r = reward();
        r.max_per_customer = None;
        assert!(RewardService::check_eligibility(&r, Utc::now(), 9999).is_ok());
    }

    #[test]
    fn sugestao_de_pontos_arredonda_para_cima() {
        // valor ₦5.000 (500000 kobo), ponto vale ₦10 (1000 kobo)
        assert_eq!(RewardService::suggested_points(500000, 1000), 500);
        // arredonda para cima
        assert_eq!(RewardService::suggested_points(1001, 1000), 2);
        // mínimo 1
        assert_eq!(RewardService::suggested_points(1, 1000), 1);
        assert_eq!(RewardService::suggested_points(0, 1000), 1);
    }
}
