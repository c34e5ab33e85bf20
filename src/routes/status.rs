use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use validator::Validate;

use crate::errors::AppError;
use crate::models::status::{MonitorStatus, StatusSnapshot, WindowQuery, WindowResponse};
use crate::services::monitor_state::SharedMonitorState;

#[utoipa::path(
    get,
    path = "/status",
    responses(
        (status = 200, description = "Current monitoring status", body = MonitorStatus)
    )
)]
pub async fn get_status(State(state): State<SharedMonitorState>) -> Json<MonitorStatus> {
    Json(state.status.read().await.clone())
}

#[utoipa::path(
    get,
    path = "/status/stream",
    responses(
        (status = 200, description = "SSE stream of status snapshots, one per tick", content_type = "text/event-stream")
    )
)]
pub async fn get_status_stream(
    State(state): State<SharedMonitorState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before reading so no tick lands between the two
    let updates = BroadcastStream::new(state.broadcaster.subscribe())
        .filter_map(|received| received.ok())
        .filter_map(status_event);

    let current = StatusSnapshot {
        as_of_ms: chrono::Utc::now().timestamp_millis() as u64,
        status: state.status.read().await.clone(),
    };
    let events = tokio_stream::iter(status_event(current))
        .chain(updates)
        .map(Ok::<Event, Infallible>);

    Sse::new(events).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}

#[utoipa::path(
    get,
    path = "/window",
    params(WindowQuery),
    responses(
        (status = 200, description = "Latest observations and bars", body = WindowResponse),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse)
    )
)]
pub async fn get_window(
    State(state): State<SharedMonitorState>,
    Query(query): Query<WindowQuery>,
) -> Result<Json<WindowResponse>, AppError> {
    query
        .validate()
        .map_err(|err| AppError::Validation(err.to_string()))?;

    let window = state.window.read().await;
    Ok(Json(WindowResponse {
        observations: tail(&window.observations, query.limit),
        bars: tail(&window.bars, query.limit),
    }))
}

fn tail<T: Clone>(items: &[T], limit: usize) -> Vec<T> {
    items[items.len().saturating_sub(limit)..].to_vec()
}

/// One `status` event per snapshot, keyed by its timestamp
fn status_event(snapshot: StatusSnapshot) -> Option<Event> {
    match Event::default()
        .event("status")
        .id(snapshot.as_of_ms.to_string())
        .json_data(&snapshot)
    {
        Ok(event) => Some(event),
        Err(e) => {
            tracing::warn!("Dropping unserializable status snapshot: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_event_builds_for_snapshot() {
        let snapshot = StatusSnapshot {
            as_of_ms: 42,
            status: MonitorStatus::starting("BTCUSDT"),
        };
        assert!(status_event(snapshot).is_some());
    }

    #[test]
    fn test_tail_keeps_newest_entries() {
        let items = vec![1, 2, 3, 4, 5];
        assert_eq!(tail(&items, 2), vec![4, 5]);
        assert_eq!(tail(&items, 10), items);
    }
}
