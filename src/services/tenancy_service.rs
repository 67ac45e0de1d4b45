// src/services/tenancy_service.rs

use rand::Rng;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::TenantRepository,
    models::tenant::{Tenant, TenantSettings, UpdateSettingsRequest},
};

// Código de adesão curto que o cliente digita no WhatsApp
const VENDOR_CODE_CHARSET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const VENDOR_CODE_LEN: usize = 6;

fn generate_vendor_code() -> String {
    let mut rng = rand::rng();
    (0..VENDOR_CODE_LEN)
        .map(|_| {
            let idx = rng.random_range(0..VENDOR_CODE_CHARSET.len());
            VENDOR_CODE_CHARSET[idx] as char
        })
        .collect()
}

#[derive(Clone)]
pub struct TenancyService {
    tenant_repo: TenantRepository,
    pool: PgPool,
}

impl TenancyService {
    pub fn new(tenant_repo: TenantRepository, pool: PgPool) -> Self {
        Self { tenant_repo, pool }
    }

    /// Provisiona um tenant: gera o código de adesão único, cria a linha
    /// de configuração com os defaults e vincula o usuário criador como
    /// membro — tudo atomicamente.
    pub async fn create_tenant_with_owner(
        &self,
        business_name: &str,
        owner_id: Uuid,
    ) -> Result<Tenant, AppError> {
        // Gera até achar um código livre (colisão é raríssima com 32^6)
        let mut vendor_code = generate_vendor_code();
        while self.tenant_repo.vendor_code_exists(&vendor_code).await? {
            vendor_code = generate_vendor_code();
        }

        let mut tx = self.pool.begin().await?;

        let tenant = self
            .tenant_repo
            .create_tenant(&mut *tx, business_name, &vendor_code)
            .await?;

        self.tenant_repo
            .add_member(&mut *tx, tenant.id, owner_id)
            .await?;

        self.tenant_repo
            .create_default_settings(&mut *tx, tenant.id)
            .await?;

        tx.commit().await?;

        Ok(tenant)
    }

    pub async fn list_user_tenants(&self, user_id: Uuid) -> Result<Vec<Tenant>, AppError> {
        self.tenant_repo.get_tenants_for_user(user_id).await
    }

    pub async fn is_member(&self, user_id: Uuid, tenant_id: Uuid) -> Result<bool, AppError> {
        self.tenant_repo.is_member(user_id, tenant_id).await
    }

    pub async fn get_settings(&self, tenant_id: Uuid) -> Result<TenantSettings, AppError> {
        self.tenant_repo.get_settings(&self.pool, tenant_id).await
    }

    pub async fn update_settings(
        &self,
        tenant_id: Uuid,
        input: &UpdateSettingsRequest,
    ) -> Result<TenantSettings, AppError> {
        // Sanidade dos valores configuráveis
        if let Some(points) = input.welcome_bonus_points {
            if points < 0 {
                return Err(AppError::InvalidInput(
                    "welcomeBonusPoints não pode ser negativo.".to_string(),
                ));
            }
        }
        if let Some(value) = input.point_value_minor {
            if value <= 0 {
                return Err(AppError::InvalidInput(
                    "pointValueMinor deve ser maior que zero.".to_string(),
                ));
            }
        }
        if let Some(hours) = input.claim_expiry_hours {
            if hours <= 0 {
                return Err(AppError::InvalidInput(
                    "claimExpiryHours deve ser maior que zero.".to_string(),
                ));
            }
        }

        self.tenant_repo
            .update_settings(&self.pool, tenant_id, input)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codigo_de_adesao_tem_6_caracteres_validos() {
        for _ in 0..50 {
            let code = generate_vendor_code();
            assert_eq!(code.len(), VENDOR_CODE_LEN);
            assert!(code.bytes().all(|b| VENDOR_CODE_CHARSET.contains(&b)));
        }
    }
}
