use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::services::monitor_state::SharedMonitorState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub monitoring_enabled: bool,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check", body = HealthResponse)
    )
)]
pub async fn health(State(state): State<SharedMonitorState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        monitoring_enabled: state.is_enabled(),
    })
}
