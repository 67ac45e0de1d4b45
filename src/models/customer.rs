// src/models/customer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "loyalty_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LoyaltyStatus {
    Active,
    Blocked,
}

// Membro do programa de fidelidade, sempre escopado a um tenant
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub tenant_id: Uuid,

    // Único por tenant (o mesmo número pode existir em vários tenants)
    pub phone: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,

    pub opted_in: bool,
    pub opted_in_at: Option<DateTime<Utc>>,

    pub loyalty_status: LoyaltyStatus,
    pub block_reason: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    // Cliente bloqueado continua tendo compras/claims registrados,
    // mas nunca acumula pontos.
    pub fn can_accrue_points(&self) -> bool {
        self.loyalty_status != LoyaltyStatus::Blocked
    }
}

// Histórico agregado usado pelas heurísticas de fraude.
// Os AVG() do Postgres chegam como NUMERIC, daí o Decimal.
#[derive(Debug, Clone)]
pub struct CustomerClaimHistory {
    pub total_claims: i64,
    pub rejected_claims: i64,
    pub avg_approved_amount_minor: Option<rust_decimal::Decimal>,
    // Quantas claims recentes têm exatamente o mesmo valor da atual
    pub same_amount_recent: i64,
    pub enrolled_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(status: LoyaltyStatus) -> Customer {
        Customer {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            phone: "+2348012345678".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
            opted_in: true,
            opted_in_at: Some(Utc::now()),
            loyalty_status: status,
            block_reason: None,
            deleted_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn cliente_ativo_acumula_pontos() {
        assert!(customer(LoyaltyStatus::Active).can_accrue_points());
    }

    #[test]
    fn cliente_bloqueado_nao_acumula() {
        assert!(!customer(LoyaltyStatus::Blocked).can_accrue_points());
    }
}
