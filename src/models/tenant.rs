// src/models/tenant.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// ---
// Moeda base do tenant
// ---
// A moeda define a taxa de conversão compra -> pontos (ver services/earn_rate.rs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "currency_code", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Ngn,
    Gbp,
    Usd,
    Eur,
}

// ---
// 1. Tenant (O "Estabelecimento")
// ---
// A conta principal do vendedor no programa de fidelidade
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    pub business_name: String,

    // Código que o cliente manda no WhatsApp para aderir ao programa
    pub vendor_code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 2. Configurações do tenant
// ---
// O core do ledger lê esta linha; só o dashboard escreve nela.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantSettings {
    #[schema(ignore)] // O contexto (Header) já define a loja
    pub tenant_id: Uuid,

    pub home_currency: Currency,

    pub welcome_bonus_enabled: bool,
    pub welcome_bonus_points: i64,

    // Valor monetário de 1 ponto em unidades menores (burn rate)
    #[schema(example = 1000)]
    pub point_value_minor: i64,

    pub claim_expiry_hours: i32,

    // Limiares das heurísticas de fraude
    pub fraud_high_amount_minor: i64,
    pub fraud_new_customer_days: i32,
    pub fraud_rejection_rate_pct: i32,
    pub fraud_rejection_min_claims: i32,
    pub fraud_repeated_amount_window_days: i32,

    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub home_currency: Option<Currency>,
    pub welcome_bonus_enabled: Option<bool>,
    pub welcome_bonus_points: Option<i64>,
    pub point_value_minor: Option<i64>,
    pub claim_expiry_hours: Option<i32>,
    pub fraud_high_amount_minor: Option<i64>,
    pub fraud_new_customer_days: Option<i32>,
    pub fraud_rejection_rate_pct: Option<i32>,
    pub fraud_rejection_min_claims: Option<i32>,
    pub fraud_repeated_amount_window_days: Option<i32>,
}
