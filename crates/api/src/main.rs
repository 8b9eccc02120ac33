//! Constance tracker API server

use axum::{
    routing::{get, post},
    Router,
};
use processor::{CheckItemService, RecalcService};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

mod auth;
mod error;
mod routes;
mod state;

use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("processor=debug".parse()?)
                .add_directive("api=debug".parse()?),
        )
        .init();

    info!("Starting Constance API");

    let config = common::Config::from_env();
    config.validate()?;

    let pool = db::create_pool(&config.database_url, config.max_connections).await?;
    db::run_migrations(&pool).await?;

    let checks = CheckItemService::load(pool.clone()).await?;

    if config.recalc_interval_hours > 0 {
        let recalc = RecalcService::new(
            pool.clone(),
            Duration::from_secs(config.recalc_interval_hours as u64 * 60 * 60),
        );
        tokio::spawn(async move {
            recalc.run().await;
        });
        info!(
            "Background constance recalculation enabled (every {} hours)",
            config.recalc_interval_hours
        );
    } else {
        info!("Background constance recalculation disabled (RECALC_INTERVAL_HOURS=0)");
    }

    let state = Arc::new(AppState::new(pool, checks));

    let app = Router::new()
        .route("/health", get(routes::health::health))
        .route("/api/routines/:id/check", post(routes::checks::check))
        .route("/api/users/me/constance", get(routes::users::constance))
        .route("/api/goals/:id/complete", post(routes::goals::complete))
        .route("/api/goals/:id/uncomplete", post(routes::goals::uncomplete))
        .route("/api/recalculate", post(routes::recalc::trigger))
        .with_state(state)
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        );

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
