// src/handlers/rewards.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::reward::Reward,
    services::reward_service::RewardInput,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RewardPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Café grátis")]
    pub name: String,

    pub description: Option<String>,

    // O dashboard sugere um valor (ceil(valor / valor_do_ponto)), mas o
    // servidor valida por conta própria — nunca confia na sugestão.
    #[validate(range(min = 1, message = "pointsRequired deve ser maior que zero."))]
    #[schema(example = 10)]
    pub points_required: i64,

    #[schema(example = 150000)]
    pub value_minor: Option<i64>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    pub stock_quantity: Option<i32>,
    pub max_per_customer: Option<i32>,

    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,

    pub terms: Option<String>,
}

fn default_true() -> bool {
    true
}

impl From<RewardPayload> for RewardInput {
    fn from(p: RewardPayload) -> Self {
        RewardInput {
            name: p.name,
            description: p.description,
            points_required: p.points_required,
            value_minor: p.value_minor,
            is_active: p.is_active,
            stock_quantity: p.stock_quantity,
            max_per_customer: p.max_per_customer,
            valid_from: p.valid_from,
            valid_until: p.valid_until,
            terms: p.terms,
        }
    }
}

// POST /api/rewards
#[utoipa::path(
    post,
    path = "/api/rewards",
    tag = "Rewards",
    request_body = RewardPayload,
    responses((status = 201, description = "Recompensa criada", body = Reward)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn create_reward(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<RewardPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reward = app_state
        .reward_service
        .create(tenant.0, payload.into())
        .await?;

    Ok((StatusCode::CREATED, Json(reward)))
}

// GET /api/rewards
#[utoipa::path(
    get,
    path = "/api/rewards",
    tag = "Rewards",
    params(
        PageParams,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Catálogo do tenant, paginado")),
    security(("api_jwt" = []))
)]
pub async fn list_rewards(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.reward_service.list(tenant.0, &params).await?;

    Ok(Json(page))
}

// PUT /api/rewards/{id}
#[utoipa::path(
    put,
    path = "/api/rewards/{id}",
    tag = "Rewards",
    request_body = RewardPayload,
    params(
        ("id" = Uuid, Path, description = "ID da recompensa"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Recompensa atualizada", body = Reward)),
    security(("api_jwt" = []))
)]
pub async fn update_reward(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(reward_id): Path<Uuid>,
    Json(payload): Json<RewardPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reward = app_state
        .reward_service
        .update(tenant.0, reward_id, payload.into())
        .await?;

    Ok(Json(reward))
}

// DELETE /api/rewards/{id}
#[utoipa::path(
    delete,
    path = "/api/rewards/{id}",
    tag = "Rewards",
    params(
        ("id" = Uuid, Path, description = "ID da recompensa"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 204, description = "Recompensa removida do catálogo (soft delete)")),
    security(("api_jwt" = []))
)]
pub async fn delete_reward(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(reward_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.reward_service.delete(tenant.0, reward_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
