use crate::models::AppState;
use axum::Router;

pub mod health_routes;
pub mod notification_routes;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", notification_routes::router())
        .merge(health_routes::router())
        .with_state(state)
}
