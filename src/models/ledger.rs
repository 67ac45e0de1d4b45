// src/models/ledger.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Mapeia o CREATE TYPE point_transaction_kind do banco
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "point_transaction_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PointTransactionKind {
    Earned,
    Redeemed,
    Expired,
    Adjusted,
}

// ---
// Saldo materializado por (tenant, cliente)
// ---
// Invariantes: current_balance = total_earned - total_redeemed, e nunca negativo.
// Só o LedgerService escreve aqui.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointsBalance {
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub current_balance: i64,
    pub total_earned: i64,
    pub total_redeemed: i64,
}

// ---
// Lançamento do livro-razão (append-only)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PointsTransaction {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub customer_id: Uuid,
    pub kind: PointTransactionKind,

    // Quantidade com sinal: positiva credita, negativa debita
    pub points: i64,

    pub description: String,

    // Referências à origem (purchaseId, redemptionId, claimId...)
    pub metadata: Value,

    pub created_at: DateTime<Utc>,
}
