// src/handlers/claims.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::claim::{ClaimStatus, PurchaseClaim},
    services::claim_service::ReviewAction,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitClaimPayload {
    pub customer_id: Uuid,

    #[serde(alias = "amountNgn")]
    #[validate(range(min = 1, message = "O valor da compra deve ser maior que zero."))]
    #[schema(example = 500000)]
    pub amount_minor: i64,

    #[schema(example = "in_store")]
    pub channel: Option<String>,

    #[validate(url(message = "A URL do recibo é inválida."))]
    pub receipt_url: Option<String>,

    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewClaimPayload {
    pub action: ReviewAction,

    // Obrigatório quando action = reject
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ClaimListQuery {
    pub status: Option<ClaimStatus>,
}

// POST /api/claims
#[utoipa::path(
    post,
    path = "/api/claims",
    tag = "Claims",
    request_body = SubmitClaimPayload,
    responses(
        (status = 201, description = "Reivindicação registrada com flags de fraude", body = PurchaseClaim)
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn submit_claim(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<SubmitClaimPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let claim = app_state
        .claim_service
        .submit(
            tenant.0,
            payload.customer_id,
            payload.amount_minor,
            payload.channel.as_deref(),
            payload.receipt_url.as_deref(),
            payload.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(claim)))
}

// GET /api/claims
#[utoipa::path(
    get,
    path = "/api/claims",
    tag = "Claims",
    params(
        PageParams,
        ClaimListQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Reivindicações por status, paginadas")),
    security(("api_jwt" = []))
)]
pub async fn list_claims(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<PageParams>,
    Query(filter): Query<ClaimListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .claim_service
        .list(tenant.0, filter.status, &params)
        .await?;

    Ok(Json(page))
}

// POST /api/claims/{id}/review
#[utoipa::path(
    post,
    path = "/api/claims/{id}/review",
    tag = "Claims",
    request_body = ReviewClaimPayload,
    params(
        ("id" = Uuid, Path, description = "ID da reivindicação"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses(
        (status = 200, description = "Reivindicação decidida", body = PurchaseClaim),
        (status = 409, description = "Já revisada (ou vencida) — confirmação idempotente")
    ),
    security(("api_jwt" = []))
)]
pub async fn review_claim(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(claim_id): Path<Uuid>,
    Json(payload): Json<ReviewClaimPayload>,
) -> Result<impl IntoResponse, AppError> {
    let claim = app_state
        .claim_service
        .review(
            tenant.0,
            claim_id,
            payload.action,
            payload.rejection_reason.as_deref(),
        )
        .await?;

    Ok(Json(claim))
}
