// src/handlers/tenancy.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, tenancy::TenantContext},
    models::tenant::{Tenant, TenantSettings, UpdateSettingsRequest},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantPayload {
    #[validate(length(min = 2, message = "O nome do negócio deve ter no mínimo 2 caracteres."))]
    #[schema(example = "Padaria da Ada")]
    pub business_name: String,
}

// POST /api/tenants
#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = "Tenants",
    request_body = CreateTenantPayload,
    responses(
        (status = 201, description = "Tenant provisionado com código de adesão", body = Tenant)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<CreateTenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let tenant = app_state
        .tenancy_service
        .create_tenant_with_owner(&payload.business_name, user.id)
        .await?;

    Ok((StatusCode::CREATED, Json(tenant)))
}

// GET /api/tenants
#[utoipa::path(
    get,
    path = "/api/tenants",
    tag = "Tenants",
    responses((status = 200, description = "Tenants do usuário", body = Vec<Tenant>)),
    security(("api_jwt" = []))
)]
pub async fn list_my_tenants(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, AppError> {
    let tenants = app_state.tenancy_service.list_user_tenants(user.id).await?;

    Ok(Json(tenants))
}

// GET /api/tenants/settings
#[utoipa::path(
    get,
    path = "/api/tenants/settings",
    tag = "Tenants",
    responses((status = 200, description = "Configurações do tenant", body = TenantSettings)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.tenancy_service.get_settings(tenant.0).await?;

    Ok(Json(settings))
}

// PUT /api/tenants/settings
#[utoipa::path(
    put,
    path = "/api/tenants/settings",
    tag = "Tenants",
    request_body = UpdateSettingsRequest,
    responses((status = 200, description = "Configurações atualizadas", body = TenantSettings)),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let settings = app_state
        .tenancy_service
        .update_settings(tenant.0, &payload)
        .await?;

    Ok(Json(settings))
}
