// src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post, put},
};
use std::env;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::db::{CustomerRepository, OutboxRepository};
use crate::docs::ApiDoc;
use crate::middleware::{auth::auth_guard, tenancy::tenant_guard};
use crate::services::notifier::{LogWhatsappGateway, NotificationDispatcher};

// Cadências dos trabalhos de fundo
const SWEEP_INTERVAL_SECS: u64 = 60;
const DISPATCH_INTERVAL_SECS: u64 = 5;
const SWEEP_BATCH: i64 = 100;
const DISPATCH_BATCH: i64 = 50;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // ---
    // Varredura de expiração: resgates pendentes vencidos são estornados;
    // claims vencidas viram terminais. Junto com o caminho preguiçoso do
    // verify, garante que nada fica "pendente-mas-inutilizável" segurando
    // pontos reservados.
    // ---
    {
        let redemption_service = app_state.redemption_service.clone();
        let claim_service = app_state.claim_service.clone();
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(SWEEP_INTERVAL_SECS));
            loop {
                ticker.tick().await;

                match redemption_service.expire_due(SWEEP_BATCH).await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("⏱️ {} resgates expirados e estornados", n),
                    Err(e) => tracing::error!("🔥 Varredura de resgates falhou: {}", e),
                }

                match claim_service.expire_due().await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!("⏱️ {} reivindicações expiradas", n),
                    Err(e) => tracing::error!("🔥 Varredura de claims falhou: {}", e),
                }
            }
        });
    }

    // ---
    // Despachante do outbox: entrega as notificações WhatsApp comitadas
    // junto com as mutações do ledger. Falha de entrega nunca desfaz nada.
    // ---
    {
        let dispatcher = NotificationDispatcher::new(
            OutboxRepository::new(app_state.db_pool.clone()),
            CustomerRepository::new(app_state.db_pool.clone()),
            LogWhatsappGateway,
        );
        tokio::spawn(async move {
            let mut ticker =
                tokio::time::interval(std::time::Duration::from_secs(DISPATCH_INTERVAL_SECS));
            loop {
                ticker.tick().await;
                if let Err(e) = dispatcher.run_once(DISPATCH_BATCH).await {
                    tracing::error!("🔥 Despachante de notificações falhou: {}", e);
                }
            }
        });
    }

    // Define as rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas que só precisam de usuário autenticado (sem tenant)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let tenancy_routes = Router::new()
        .route(
            "/",
            post(handlers::tenancy::create_tenant).get(handlers::tenancy::list_my_tenants),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Tudo daqui para baixo exige auth + X-Tenant-ID de um tenant do qual
    // o usuário é membro. A ordem dos layers importa: auth roda primeiro.
    let settings_routes = Router::new()
        .route(
            "/settings",
            get(handlers::tenancy::get_settings).put(handlers::tenancy::update_settings),
        );

    let customer_routes = Router::new()
        .route(
            "/",
            post(handlers::customers::create_customer).get(handlers::customers::list_customers),
        )
        .route("/{id}", get(handlers::customers::get_customer))
        .route(
            "/{id}/transactions",
            get(handlers::customers::list_customer_transactions),
        )
        .route("/{id}/adjust-points", post(handlers::customers::adjust_points))
        .route("/{id}/block", post(handlers::customers::block_customer));

    let purchase_routes = Router::new().route(
        "/",
        post(handlers::purchases::log_purchase).get(handlers::purchases::list_purchases),
    );

    let claim_routes = Router::new()
        .route(
            "/",
            post(handlers::claims::submit_claim).get(handlers::claims::list_claims),
        )
        .route("/{id}/review", post(handlers::claims::review_claim));

    let reward_routes = Router::new()
        .route(
            "/",
            post(handlers::rewards::create_reward).get(handlers::rewards::list_rewards),
        )
        .route(
            "/{id}",
            put(handlers::rewards::update_reward).delete(handlers::rewards::delete_reward),
        );

    let redemption_routes = Router::new()
        .route(
            "/",
            post(handlers::redemptions::redeem).get(handlers::redemptions::list_redemptions),
        )
        .route("/verify", post(handlers::redemptions::verify_redemption))
        .route("/{id}/fulfill", post(handlers::redemptions::fulfill_redemption))
        .route("/{id}/cancel", post(handlers::redemptions::cancel_redemption));

    let tenant_scoped = Router::new()
        .nest("/tenants", settings_routes)
        .nest("/customers", customer_routes)
        .nest("/purchases", purchase_routes)
        .nest("/claims", claim_routes)
        .nest("/rewards", reward_routes)
        .nest("/redemptions", redemption_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            tenant_guard,
        ))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // CORS para o dashboard React
    let cors = CorsLayer::permissive();

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/tenants", tenancy_routes)
        .nest("/api", tenant_scoped)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Inicia o servidor
    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
