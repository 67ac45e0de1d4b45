// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::{
    db::{
        ClaimRepository, CustomerRepository, LedgerRepository, OutboxRepository,
        PurchaseRepository, RedemptionRepository, RewardRepository, TenantRepository,
        UserRepository,
    },
    services::{
        AuthService, ClaimService, CustomerService, LedgerService, PurchaseService,
        RedemptionService, RewardService, TenancyService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub tenancy_service: TenancyService,
    pub customer_service: CustomerService,
    pub ledger_service: LedgerService,
    pub purchase_service: PurchaseService,
    pub claim_service: ClaimService,
    pub reward_service: RewardService,
    pub redemption_service: RedemptionService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let customer_repo = CustomerRepository::new(db_pool.clone());
        let ledger_repo = LedgerRepository::new(db_pool.clone());
        let purchase_repo = PurchaseRepository::new(db_pool.clone());
        let claim_repo = ClaimRepository::new(db_pool.clone());
        let reward_repo = RewardRepository::new(db_pool.clone());
        let redemption_repo = RedemptionRepository::new(db_pool.clone());
        let outbox_repo = OutboxRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo, jwt_secret, db_pool.clone());
        let tenancy_service = TenancyService::new(tenant_repo.clone(), db_pool.clone());
        let ledger_service = LedgerService::new(ledger_repo.clone(), db_pool.clone());

        let customer_service = CustomerService::new(
            customer_repo.clone(),
            ledger_repo,
            tenant_repo.clone(),
            ledger_service.clone(),
            db_pool.clone(),
        );
        let purchase_service = PurchaseService::new(
            purchase_repo.clone(),
            customer_repo.clone(),
            tenant_repo.clone(),
            outbox_repo.clone(),
            ledger_service.clone(),
            db_pool.clone(),
        );
        let claim_service = ClaimService::new(
            claim_repo,
            customer_repo.clone(),
            purchase_repo,
            tenant_repo,
            outbox_repo.clone(),
            ledger_service.clone(),
            db_pool.clone(),
        );
        let reward_service = RewardService::new(reward_repo.clone(), db_pool.clone());
        let redemption_service = RedemptionService::new(
            redemption_repo,
            reward_repo,
            customer_repo,
            outbox_repo,
            ledger_service.clone(),
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            auth_service,
            tenancy_service,
            customer_service,
            ledger_service,
            purchase_service,
            claim_service,
            reward_service,
            redemption_service,
        })
    }
}
