// src/models/reward.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Item do catálogo de recompensas do tenant
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub name: String,
    pub description: Option<String>,

    pub points_required: i64,

    // Valor monetário de referência (unidades menores)
    pub value_minor: Option<i64>,

    pub is_active: bool,

    // NULL = estoque ilimitado
    pub stock_quantity: Option<i32>,

    // NULL = sem limite de resgates por cliente
    pub max_per_customer: Option<i32>,

    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,

    pub terms: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reward {
    // Janela de validade: ausência de limite significa "sempre válida".
    pub fn is_within_validity(&self, now: DateTime<Utc>) -> bool {
        if let Some(from) = self.valid_from {
            if now < from {
                return false;
            }
        }
        if let Some(until) = self.valid_until {
            if now > until {
                return false;
            }
        }
        true
    }

    pub fn has_stock(&self) -> bool {
        match self.stock_quantity {
            None => true, // ilimitado
            Some(qty) => qty > 0,
        }
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
            name: "Café grátis".to_string(),
            description: None,
            points_required: 10,
            value_minor: Some(150000),
            is_active: true,
            stock_quantity: None,
            max_per_customer: None,
            valid_from: None,
            valid_until: None,
            terms: None,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn sem_janela_sempre_valida() {
        assert!(reward().is_within_validity(Utc::now()));
    }

    #[test]
    fn antes_do_valid_from_e_invalida() {
        let mut r = reward();
        r.valid_from = Some(Utc::now() + Duration::days(1));
        assert!(!r.is_within_validity(Utc::now()));
    }

    #[test]
    fn depois_do_valid_until_e_invalida() {
        let mut r = reward();
        r.valid_until = Some(Utc::now() - Duration::days(1));
        assert!(!r.is_within_validity(Utc::now()));
    }

    #[test]
    fn estoque_nulo_e_ilimitado() {
        let mut r = reward();
        r.stock_quantity = None;
        assert!(r.has_stock());

        r.stock_quantity = Some(0);
        assert!(!r.has_stock());

        r.stock_quantity = Some(3);
        assert!(r.has_stock());
    }
}
