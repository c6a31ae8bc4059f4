//src/main.rs

use axum::{
    routing::{get, patch},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;

fn build_router(app_state: AppState) -> Router {
    // Painel: Curva ABC e valorização do estoque
    let analytics_routes = Router::new()
        .route("/abc"
               ,get(handlers::analytics::get_abc_analysis)
               .post(handlers::analytics::classify_products)
        )
        .route("/abc/summary"
               ,get(handlers::analytics::get_abc_summary)
        )
        .route("/valorisation"
               ,get(handlers::analytics::get_valorisation)
               .post(handlers::analytics::aggregate_valorisation)
        );

    // Camada genérica de dados (cadastros)
    let data_routes = Router::new()
        .route("/{table}"
               ,get(handlers::data::query_table)
               .post(handlers::data::insert_row)
        )
        .route("/{table}/{id}"
               ,patch(handlers::data::update_row)
               .delete(handlers::data::delete_row)
        );

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/analytics", analytics_routes)
        .nest("/api/data", data_routes)
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; padrão "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let settings = Settings::from_env()?;
    let db_pool = AppState::connect(&settings).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let app = build_router(AppState::new(db_pool));

    let listener = TcpListener::bind(&settings.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
