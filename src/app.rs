use axum::{extract::State, middleware, routing::get, Json, Router};
use serde_json::json;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tower_http::services::ServeDir;

use crate::{
    app_state::AppState,
    middleware::tracing::observability_middleware,
    modules::{admin::routes::admin_routes, public::routes::public_routes},
};

pub fn create_router(state: AppState) -> Router {
    let static_dir = state.env.app.static_dir.clone();

    Router::new()
        .route("/health", get(health_check))
        .merge(public_routes())
        .merge(admin_routes())
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(middleware::from_fn(observability_middleware))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let db_status = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::warn!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    let telemetry_health = crate::telemetry::telemetry_health_check();
    let timestamp = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_default();

    Json(json!({
        "status": if db_status == "healthy" { "ok" } else { "degraded" },
        "timestamp": timestamp,
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.env.app.environment.as_str(),
        "services": {
            "database": db_status,
            "telemetry": telemetry_health
        }
    }))
}
