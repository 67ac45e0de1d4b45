// src/handlers/purchases.rs

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::purchase::Purchase,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogPurchasePayload {
    pub customer_id: Uuid,

    // Valor canônico em unidades menores (kobo/pence/cent). O dashboard
    // antigo ainda manda "amountNgn" — aceito só como alias de entrada.
    #[serde(alias = "amountNgn")]
    #[validate(range(min = 1, message = "O valor da compra deve ser maior que zero."))]
    #[schema(example = 150000)]
    pub amount_minor: i64,

    pub description: Option<String>,
    pub channel: Option<String>,

    // Ausente = agora
    pub purchase_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseListQuery {
    // Filtro opcional por cliente
    pub customer_id: Option<Uuid>,
}

// POST /api/purchases
#[utoipa::path(
    post,
    path = "/api/purchases",
    tag = "Purchases",
    request_body = LogPurchasePayload,
    responses(
        (status = 201, description = "Compra registrada; pontos calculados no servidor", body = Purchase)
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn log_purchase(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<LogPurchasePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let purchase = app_state
        .purchase_service
        .log_purchase(
            tenant.0,
            payload.customer_id,
            payload.amount_minor,
            payload.description.as_deref(),
            payload.channel.as_deref(),
            payload.purchase_date,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(purchase)))
}

// GET /api/purchases
#[utoipa::path(
    get,
    path = "/api/purchases",
    tag = "Purchases",
    params(
        PageParams,
        PurchaseListQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Histórico de compras, paginado")),
    security(("api_jwt" = []))
)]
pub async fn list_purchases(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<PageParams>,
    Query(filter): Query<PurchaseListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .purchase_service
        .list(tenant.0, filter.customer_id, &params)
        .await?;

    Ok(Json(page))
}
