// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Tenants ---
        handlers::tenancy::create_tenant,
        handlers::tenancy::list_my_tenants,
        handlers::tenancy::get_settings,
        handlers::tenancy::update_settings,

        // --- Customers ---
        handlers::customers::create_customer,
        handlers::customers::list_customers,
        handlers::customers::get_customer,
        handlers::customers::list_customer_transactions,
        handlers::customers::adjust_points,
        handlers::customers::block_customer,

        // --- Purchases ---
        handlers::purchases::log_purchase,
        handlers::purchases::list_purchases,

        // --- Claims ---
        handlers::claims::submit_claim,
        handlers::claims::list_claims,
        handlers::claims::review_claim,

        // --- Rewards ---
        handlers::rewards::create_reward,
        handlers::rewards::list_rewards,
        handlers::rewards::update_reward,
        handlers::rewards::delete_reward,

        // --- Redemptions ---
        handlers::redemptions::redeem,
        handlers::redemptions::verify_redemption,
        handlers::redemptions::fulfill_redemption,
        handlers::redemptions::cancel_redemption,
        handlers::redemptions::list_redemptions,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::AuthResponse,
            handlers::auth::RegisterUserPayload,
            handlers::auth::LoginUserPayload,

            // --- Tenants ---
            models::tenant::Currency,
            models::tenant::Tenant,
            models::tenant::TenantSettings,
            models::tenant::UpdateSettingsRequest,
            handlers::tenancy::CreateTenantPayload,

            // --- Customers ---
            models::customer::LoyaltyStatus,
            models::customer::Customer,
            handlers::customers::CreateCustomerPayload,
            handlers::customers::AdjustPointsPayload,
            handlers::customers::BlockCustomerPayload,
            handlers::customers::CustomerDetail,
            services::customer_service::AdjustmentType,

            // --- Ledger ---
            models::ledger::PointTransactionKind,
            models::ledger::PointsBalance,
            models::ledger::PointsTransaction,

            // --- Purchases ---
            models::purchase::PurchaseSource,
            models::purchase::Purchase,
            handlers::purchases::LogPurchasePayload,

            // --- Claims ---
            models::claim::ClaimStatus,
            models::claim::FraudFlag,
            models::claim::PurchaseClaim,
            handlers::claims::SubmitClaimPayload,
            handlers::claims::ReviewClaimPayload,
            services::claim_service::ReviewAction,

            // --- Rewards ---
            models::reward::Reward,
            handlers::rewards::RewardPayload,

            // --- Redemptions ---
            models::redemption::RedemptionStatus,
            models::redemption::Redemption,
            handlers::redemptions::RedeemPayload,
            handlers::redemptions::VerifyRedemptionPayload,
            handlers::redemptions::FulfillRedemptionPayload,
            handlers::redemptions::CancelRedemptionPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Tenants", description = "Provisionamento e Configurações da Loja"),
        (name = "Customers", description = "Clientes do Programa de Fidelidade"),
        (name = "Purchases", description = "Compras Confirmadas pelo Vendedor"),
        (name = "Claims", description = "Reivindicações de Compra (Revisão e Fraude)"),
        (name = "Rewards", description = "Catálogo de Recompensas"),
        (name = "Redemptions", description = "Resgates e Códigos de Uso Único")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
