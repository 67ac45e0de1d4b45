// src/models/claim.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "claim_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Pending,
    Approved,
    Rejected,
    Expired,
}

// ---
// Sinalizadores de fraude
// ---
// São APENAS consultivos: aparecem como aviso para o vendedor na revisão,
// nunca bloqueiam a aprovação.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "fraud_flag", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FraudFlag {
    HighAmount,
    NewCustomer,
    NoReceipt,
    HighRejectionRate,
    RepeatedAmount,
}

// Compra auto-reportada pelo cliente, aguardando revisão do vendedor.
// Ciclo de vida: pending -> approved | rejected (terminal) ou expira.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseClaim {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub customer_id: Uuid,

    pub amount_minor: i64,
    pub channel: Option<String>,
    pub receipt_url: Option<String>,
    pub description: Option<String>,

    pub fraud_flags: Vec<FraudFlag>,

    pub status: ClaimStatus,
    pub rejection_reason: Option<String>,

    // Compra criada na aprovação
    pub purchase_id: Option<Uuid>,

    pub expires_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PurchaseClaim {
    // Uma claim pendente mas vencida já não pode ser revisada,
    // mesmo que a varredura ainda não a tenha marcado como expirada.
    pub fn is_reviewable(&self, now: DateTime<Utc>) -> bool {
        self.status == ClaimStatus::Pending && self.expires_at > now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claim(status: ClaimStatus, expires_in: Duration) -> PurchaseClaim {
        let now = Utc::now();
        PurchaseClaim {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            customer_id: Uuid::new_v4(),
            amount_minor: 500000,
            channel: None,
            receipt_url: None,
            description: None,
            fraud_flags: vec![],
            status,
            rejection_reason: None,
            purchase_id: None,
            expires_at: now + expires_in,
            reviewed_at: None,
            created_at: now,
        }
    }

    #[test]
    fn claim_pendente_dentro_do_prazo_e_revisavel() {
        let c = claim(ClaimStatus::Pending, Duration::hours(1));
        assert!(c.is_reviewable(Utc::now()));
    }

    #[test]
    fn claim_vencida_nao_e_revisavel() {
        let c = claim(ClaimStatus::Pending, Duration::hours(-1));
        assert!(!c.is_reviewable(Utc::now()));
    }

    #[test]
    fn claim_ja_revisada_nao_e_revisavel() {
        let c = claim(ClaimStatus::Approved, Duration::hours(1));
        assert!(!c.is_reviewable(Utc::now()));
    }
}
