mod config;
mod errors;
mod occupations;
mod planning;
mod retrieval;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::retrieval::source::{CatalogModuleSource, ModuleSource};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting advisor v{}", env!("CARGO_PKG_VERSION"));

    let module_source: Arc<dyn ModuleSource> = match &config.catalog_path {
        Some(path) => Arc::new(CatalogModuleSource::from_json_file(path)?),
        None => {
            info!("CATALOG_PATH not set, serving the built-in module catalog");
            Arc::new(CatalogModuleSource::builtin())
        }
    };

    info!(
        "Planner: {} graduation credits, {} main-plan credits, {}-{} semesters, first semester {}",
        config.planner.graduation_credits,
        config.planner.main_plan_credits,
        config.planner.min_semesters,
        config.planner.max_semesters,
        config.first_season
    );

    let state = AppState {
        config: config.clone(),
        module_source,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
