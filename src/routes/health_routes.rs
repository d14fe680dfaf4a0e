use axum::{Json, Router, extract::State, routing::get};

use crate::error::ApiError;
use crate::models::AppState;

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub data: HealthData,
}

#[derive(serde::Serialize)]
pub struct HealthData {
    pub ok: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    // round-trip the pool so "up" means the database answers too
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
        .map_err(ApiError::db)?;

    Ok(Json(HealthResponse {
        data: HealthData { ok: true },
    }))
}
