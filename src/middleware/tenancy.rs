// src/middleware/tenancy.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{common::error::AppError, config::AppState, models::auth::User};

// O nome do nosso cabeçalho HTTP customizado
const TENANT_ID_HEADER: &str = "x-tenant-id";

// O contexto do tenant que o utilizador quer aceder.
// Só entra nas extensions depois que o tenant_guard confirmou que o
// usuário autenticado é membro do tenant.
#[derive(Debug, Clone, Copy)]
pub struct TenantContext(pub Uuid);

// Middleware: lê o X-Tenant-ID, valida a filiação e injeta o contexto.
// Roda depois do auth_guard (precisa do User nas extensions).
pub async fn tenant_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = request
        .headers()
        .get(TENANT_ID_HEADER)
        .ok_or_else(|| {
            AppError::InvalidInput("O cabeçalho X-Tenant-ID é obrigatório.".to_string())
        })?;

    let value_str = header_value.to_str().map_err(|_| {
        AppError::InvalidInput("Cabeçalho X-Tenant-ID contém caracteres inválidos.".to_string())
    })?;

    let tenant_id = Uuid::parse_str(value_str).map_err(|_| {
        AppError::InvalidInput("Cabeçalho X-Tenant-ID inválido (não é um UUID).".to_string())
    })?;

    let user = request
        .extensions()
        .get::<User>()
        .cloned()
        .ok_or(AppError::InvalidToken)?;

    // O usuário só enxerga tenants dos quais é membro
    let is_member = app_state
        .tenancy_service
        .is_member(user.id, tenant_id)
        .await?;
    if !is_member {
        return Err(AppError::TenantAccessDenied);
    }

    request.extensions_mut().insert(TenantContext(tenant_id));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<TenantContext>()
            .copied()
            .ok_or_else(|| {
                AppError::InvalidInput("O cabeçalho X-Tenant-ID é obrigatório.".to_string())
            })
    }
}
