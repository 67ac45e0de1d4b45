// src/models/purchase.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "purchase_source", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PurchaseSource {
    // Registrada diretamente pelo vendedor no dashboard
    Vendor,
    // Gerada pela aprovação de uma reivindicação do cliente
    Claim,
}

// Compra confirmada. Imutável depois de criada — só o ledger a referencia.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub customer_id: Uuid,

    // Sempre em unidades menores da moeda (kobo, pence, cent)
    pub amount_minor: i64,

    pub description: Option<String>,
    pub channel: Option<String>,
    pub purchase_date: DateTime<Utc>,

    // 0 quando o cliente estava bloqueado no momento da compra
    pub points_awarded: i64,

    pub source: PurchaseSource,
    pub created_at: DateTime<Utc>,
}
