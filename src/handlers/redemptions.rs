// src/handlers/redemptions.rs

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
    models::redemption::{Redemption, RedemptionStatus},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RedeemPayload {
    pub customer_id: Uuid,
    pub reward_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRedemptionPayload {
    #[validate(length(min = 4, message = "Código de resgate inválido."))]
    #[schema(example = "AB12CD34")]
    pub redemption_code: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FulfillRedemptionPayload {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelRedemptionPayload {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RedemptionListQuery {
    pub status: Option<RedemptionStatus>,
}

// POST /api/redemptions
#[utoipa::path(
    post,
    path = "/api/redemptions",
    tag = "Redemptions",
    request_body = RedeemPayload,
    responses(
        (status = 201, description = "Pontos reservados, código emitido", body = Redemption),
        (status = 409, description = "Recompensa indisponível ou limite atingido"),
        (status = 422, description = "Saldo insuficiente")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn redeem(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<RedeemPayload>,
) -> Result<impl IntoResponse, AppError> {
    let redemption = app_state
        .redemption_service
        .redeem(tenant.0, payload.customer_id, payload.reward_id)
        .await?;

    Ok((StatusCode::CREATED, Json(redemption)))
}

// POST /api/redemptions/verify
#[utoipa::path(
    post,
    path = "/api/redemptions/verify",
    tag = "Redemptions",
    request_body = VerifyRedemptionPayload,
    responses(
        (status = 200, description = "Detalhe do resgate para conferência", body = Redemption),
        (status = 404, description = "Código não encontrado"),
        (status = 409, description = "Resgate já utilizado, cancelado ou expirado")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn verify_redemption(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<VerifyRedemptionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let redemption = app_state
        .redemption_service
        .verify(tenant.0, payload.redemption_code.trim())
        .await?;

    Ok(Json(redemption))
}

// POST /api/redemptions/{id}/fulfill
#[utoipa::path(
    post,
    path = "/api/redemptions/{id}/fulfill",
    tag = "Redemptions",
    request_body = FulfillRedemptionPayload,
    params(
        ("id" = Uuid, Path, description = "ID do resgate"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses(
        (status = 200, description = "Resgate concluído (terminal)", body = Redemption),
        (status = 409, description = "Resgate fora do estado pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn fulfill_redemption(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(redemption_id): Path<Uuid>,
    Json(payload): Json<FulfillRedemptionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let redemption = app_state
        .redemption_service
        .fulfill(tenant.0, redemption_id, payload.notes.as_deref())
        .await?;

    Ok(Json(redemption))
}

// POST /api/redemptions/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/redemptions/{id}/cancel",
    tag = "Redemptions",
    request_body = CancelRedemptionPayload,
    params(
        ("id" = Uuid, Path, description = "ID do resgate"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses(
        (status = 200, description = "Resgate cancelado, pontos estornados", body = Redemption),
        (status = 409, description = "Resgate fora do estado pendente")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_redemption(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(redemption_id): Path<Uuid>,
    Json(payload): Json<CancelRedemptionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let redemption = app_state
        .redemption_service
        .cancel(tenant.0, redemption_id, payload.reason.as_deref())
        .await?;

    Ok(Json(redemption))
}

// GET /api/redemptions
#[utoipa::path(
    get,
    path = "/api/redemptions",
    tag = "Redemptions",
    params(
        PageParams,
        RedemptionListQuery,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Resgates por status, paginados")),
    security(("api_jwt" = []))
)]
pub async fn list_redemptions(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<PageParams>,
    Query(filter): Query<RedemptionListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state
        .redemption_service
        .list(tenant.0, filter.status, &params)
        .await?;

    Ok(Json(page))
}
