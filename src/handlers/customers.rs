// src/handlers/customers.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::{customer::Customer, ledger::PointsBalance},
    services::customer_service::AdjustmentType,
};

// =============================================================================
//  PAYLOADS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCustomerPayload {
    #[validate(length(min = 8, message = "O telefone deve ter no mínimo 8 dígitos."))]
    #[schema(example = "+2348012345678")]
    pub phone: String,

    pub first_name: Option<String>,
    pub last_name: Option<String>,

    // Cadastro pelo dashboard não implica opt-in no WhatsApp
    #[serde(default)]
    pub opted_in: bool,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdjustPointsPayload {
    #[validate(range(min = 1, message = "A quantidade de pontos deve ser maior que zero."))]
    #[schema(example = 50)]
    pub points: i64,

    pub adjustment_type: AdjustmentType,

    #[validate(length(min = 1, message = "A descrição é obrigatória."))]
    #[schema(example = "Cortesia: aniversário do cliente")]
    pub description: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockCustomerPayload {
    pub block: bool,
    pub reason: Option<String>,
}

// Detalhe do cliente com o saldo junto (a tela do dashboard mostra ambos)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetail {
    #[serde(flatten)]
    pub customer: Customer,
    pub balance: PointsBalance,
}

// =============================================================================
//  HANDLERS
// =============================================================================

// POST /api/customers
#[utoipa::path(
    post,
    path = "/api/customers",
    tag = "Customers",
    request_body = CreateCustomerPayload,
    responses(
        (status = 201, description = "Cliente cadastrado (com bônus de boas-vindas, se ativo)", body = Customer),
        (status = 400, description = "Telefone já cadastrado ou dados inválidos")
    ),
    params(("x-tenant-id" = Uuid, Header, description = "ID da Loja")),
    security(("api_jwt" = []))
)]
pub async fn create_customer(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let customer = app_state
        .customer_service
        .enroll(
            tenant.0,
            &payload.phone,
            payload.first_name.as_deref(),
            payload.last_name.as_deref(),
            payload.opted_in,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

// GET /api/customers
#[utoipa::path(
    get,
    path = "/api/customers",
    tag = "Customers",
    params(
        PageParams,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Clientes do tenant, paginados")),
    security(("api_jwt" = []))
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.customer_service.list(tenant.0, &params).await?;

    Ok(Json(page))
}

// GET /api/customers/{id}
#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    tag = "Customers",
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Cliente com saldo de pontos", body = CustomerDetail)),
    security(("api_jwt" = []))
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state.customer_service.get(tenant.0, customer_id).await?;
    let balance = app_state
        .ledger_service
        .get_balance(tenant.0, customer_id)
        .await?;

    Ok(Json(CustomerDetail { customer, balance }))
}

// GET /api/customers/{id}/transactions
#[utoipa::path(
    get,
    path = "/api/customers/{id}/transactions",
    tag = "Customers",
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        PageParams,
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Extrato de pontos do cliente, paginado")),
    security(("api_jwt" = []))
)]
pub async fn list_customer_transactions(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<impl IntoResponse, AppError> {
    // 404 se o cliente não é deste tenant
    app_state.customer_service.get(tenant.0, customer_id).await?;

    let page = app_state
        .ledger_service
        .list_transactions(tenant.0, customer_id, &params)
        .await?;

    Ok(Json(page))
}

// POST /api/customers/{id}/adjust-points
#[utoipa::path(
    post,
    path = "/api/customers/{id}/adjust-points",
    tag = "Customers",
    request_body = AdjustPointsPayload,
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses(
        (status = 200, description = "Saldo após o ajuste", body = PointsBalance),
        (status = 422, description = "Saldo insuficiente para subtrair")
    ),
    security(("api_jwt" = []))
)]
pub async fn adjust_points(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<AdjustPointsPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    app_state
        .customer_service
        .adjust_points(
            tenant.0,
            customer_id,
            payload.points,
            payload.adjustment_type,
            &payload.description,
        )
        .await?;

    let balance = app_state
        .ledger_service
        .get_balance(tenant.0, customer_id)
        .await?;

    Ok(Json(balance))
}

// POST /api/customers/{id}/block
#[utoipa::path(
    post,
    path = "/api/customers/{id}/block",
    tag = "Customers",
    request_body = BlockCustomerPayload,
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("x-tenant-id" = Uuid, Header, description = "ID da Loja")
    ),
    responses((status = 200, description = "Cliente bloqueado/desbloqueado", body = Customer)),
    security(("api_jwt" = []))
)]
pub async fn block_customer(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(customer_id): Path<Uuid>,
    Json(payload): Json<BlockCustomerPayload>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state
        .customer_service
        .set_blocked(
            tenant.0,
            customer_id,
            payload.block,
            payload.reason.as_deref(),
        )
        .await?;

    Ok(Json(customer))
}
