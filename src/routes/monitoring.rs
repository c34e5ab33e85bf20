use axum::{extract::State, Json};

use crate::models::status::MonitoringToggle;
use crate::services::monitor_state::SharedMonitorState;

#[utoipa::path(
    put,
    path = "/monitoring",
    request_body = MonitoringToggle,
    responses(
        (status = 200, description = "Polling paused or resumed", body = MonitoringToggle)
    )
)]
pub async fn set_monitoring(
    State(state): State<SharedMonitorState>,
    Json(toggle): Json<MonitoringToggle>,
) -> Json<MonitoringToggle> {
    state.set_enabled(toggle.enabled);
    state.status.write().await.monitoring_enabled = toggle.enabled;

    if toggle.enabled {
        tracing::info!("Monitoring resumed");
    } else {
        tracing::info!("Monitoring paused");
    }

    Json(MonitoringToggle {
        enabled: state.is_enabled(),
    })
}
