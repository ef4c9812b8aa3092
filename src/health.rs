use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use sqlx::{Pool, Postgres};
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    database: String,
    version: String,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Service and database reachable", body = HealthResponse),
        (status = 503, description = "Database unreachable")
    )
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    match check_database_health(&state.db_pool).await {
        Ok(()) => {
            debug!("Health check passed");
            Ok(Json(HealthResponse {
                status: "OK".to_string(),
                database: "healthy".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            }))
        }
        Err(e) => {
            error!("Database health check failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

async fn check_database_health(pool: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
