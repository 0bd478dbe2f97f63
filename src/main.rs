//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Json, Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Tudo abaixo exige o Bearer token; a autorização fina fica nos
    // extratores de cada handler.
    let client_routes = Router::new()
        .route("/", get(handlers::clients::list).post(handlers::clients::create))
        .route(
            "/{id}",
            put(handlers::clients::update).delete(handlers::clients::delete),
        );

    let company_routes = Router::new()
        .route("/", get(handlers::companies::list).post(handlers::companies::create))
        .route(
            "/{id}",
            put(handlers::companies::update).delete(handlers::companies::delete),
        );

    let file_routes = Router::new()
        .route("/", get(handlers::files::list).post(handlers::files::create))
        .route(
            "/{id}",
            put(handlers::files::update).delete(handlers::files::delete),
        );

    let invoice_routes = Router::new()
        .route("/", get(handlers::invoices::list).post(handlers::invoices::create))
        .route(
            "/calculate-commission",
            post(handlers::invoices::calculate_commission),
        )
        .route(
            "/{id}",
            get(handlers::invoices::get)
                .put(handlers::invoices::update)
                .delete(handlers::invoices::delete),
        )
        .route(
            "/{id}/payment/{stage}",
            post(handlers::invoices::mark_payment).delete(handlers::invoices::unmark_payment),
        )
        .route(
            "/bulk-pay/client/{id}",
            post(handlers::invoices::bulk_pay_client),
        )
        .route(
            "/bulk-pay/distributor/{id}",
            post(handlers::invoices::bulk_pay_distributor),
        )
        .route(
            "/bulk-pay/company/{id}",
            post(handlers::invoices::bulk_pay_company),
        );

    let distributor_routes = Router::new()
        .route(
            "/",
            get(handlers::distributors::list).post(handlers::distributors::create),
        )
        .route(
            "/{id}",
            get(handlers::distributors::get).put(handlers::distributors::update),
        );

    let tier_routes = Router::new()
        .route("/", get(handlers::tiers::list).post(handlers::tiers::create))
        .route(
            "/{id}",
            put(handlers::tiers::update).delete(handlers::tiers::delete),
        );

    let protected_routes = Router::new()
        .route("/auth/me", get(handlers::auth::get_me))
        .nest("/clients", client_routes)
        .nest("/companies", company_routes)
        .nest("/files", file_routes)
        .nest("/invoices", invoice_routes)
        .nest("/distributors", distributor_routes)
        .nest("/commission-tiers", tier_routes)
        .route("/permissions", get(handlers::rbac::list_permissions))
        .route("/roles", get(handlers::rbac::list_roles))
        .route("/dashboard", get(handlers::dashboard::summary))
        .route("/reports/invoices", get(handlers::reports::invoices))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/docs/openapi.json",
            get(|| async { Json(docs::ApiDoc::openapi()) }),
        )
        .nest("/api/auth", auth_routes)
        .nest("/api", protected_routes)
        .with_state(app_state);

    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
