use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::business_logic::drop_watch::WatchState;
use crate::models::observation::{Bar, Observation};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MonitorStatus {
    pub symbol: String,
    /// IDLE or WATCHING
    pub state: String,
    pub monitoring_enabled: bool,
    pub last_price: Option<f64>,
    /// Change against the previous observation
    pub last_change: Option<f64>,
    /// Oldest retained price minus the latest price
    pub window_drop: Option<f64>,
    /// Timestamp of the oldest retained observation
    #[schema(value_type = Option<String>)]
    pub window_start: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>)]
    pub watch_start: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>)]
    pub watch_end: Option<DateTime<Utc>>,
    /// Text of the most recent notification
    pub last_alert: Option<String>,
    pub summary: String,
}

impl MonitorStatus {
    /// Status before the first tick
    pub fn starting(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            state: WatchState::Idle.into(),
            monitoring_enabled: true,
            last_price: None,
            last_change: None,
            window_drop: None,
            window_start: None,
            watch_start: None,
            watch_end: None,
            last_alert: None,
            summary: format!("{symbol}: waiting for the first price."),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusSnapshot {
    pub as_of_ms: u64,
    pub status: MonitorStatus,
}

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct WindowResponse {
    pub observations: Vec<Observation>,
    pub bars: Vec<Bar>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema, IntoParams)]
pub struct WindowQuery {
    /// Max observations and bars to return, newest last
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 500))]
    #[param(example = 60, default = 60)]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct MonitoringToggle {
    pub enabled: bool,
}

impl From<WatchState> for String {
    fn from(state: WatchState) -> Self {
        match state {
            WatchState::Idle => "IDLE".to_string(),
            WatchState::Watching => "WATCHING".to_string(),
        }
    }
}

fn default_limit() -> usize {
    60
}
