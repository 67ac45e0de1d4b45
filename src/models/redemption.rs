// src/models/redemption.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "redemption_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    Pending,
    Fulfilled,
    Cancelled,
    Expired,
}

// ---
// Resgate (reserva de pontos contra uma recompensa)
// ---
// Os pontos são debitados NA CRIAÇÃO. Fulfill não mexe no ledger;
// cancel/expire estornam o débito.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub reward_id: Uuid,
    pub customer_id: Uuid,

    // Código de uso único apresentado ao vendedor
    pub code: String,

    pub points_used: i64,

    pub status: RedemptionStatus,

    pub notes: Option<String>,
    pub cancellation_reason: Option<String>,

    pub expires_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Redemption {
    // "Acionável" = ainda pode ser fulfillado/cancelado pelo vendedor.
    pub fn is_actionable(&self, now: DateTime<Utc>) -> bool {
        self.status == RedemptionStatus::Pending && self.expires_at > now
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == RedemptionStatus::Pending && self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn redemption(status: RedemptionStatus, expires_in: Duration) -> Redemption {
        let now = Utc::now();
        Redemption {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            reward_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            code: "AB12CD34".to_string(),
            points_used: 10,
            status,
            notes: None,
            cancellation_reason: None,
            expires_at: now + expires_in,
            fulfilled_at: None,
            cancelled_at: None,
            created_at: now,
        }
    }

    #[test]
    fn pendente_dentro_do_prazo_e_acionavel() {
        let r = redemption(RedemptionStatus::Pending, Duration::hours(23));
        assert!(r.is_actionable(Utc::now()));
        assert!(!r.is_overdue(Utc::now()));
    }

    #[test]
    fn pendente_vencido_vira_overdue() {
        let r = redemption(RedemptionStatus::Pending, Duration::hours(-1));
        assert!(!r.is_actionable(Utc::now()));
        assert!(r.is_overdue(Utc::now()));
    }

    #[test]
    fn estados_terminais_nunca_sao_acionaveis() {
        for status in [
            RedemptionStatus::Fulfilled,
            RedemptionStatus::Cancelled,
            RedemptionStatus::Expired,
        ] {
            let r = redemption(status, Duration::hours(23));
            assert!(!r.is_actionable(Utc::now()));
            assert!(!r.is_overdue(Utc::now()));
        }
    }
}
