use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::business_logic::alert::{format_usd, Alert};
use crate::business_logic::config::MonitorConfig;
use crate::business_logic::drop_watch::WatchState;
use crate::business_logic::session::MonitorSession;
use crate::models::status::{MonitorStatus, StatusSnapshot, WindowResponse};
use crate::services::binance::PriceSource;
use crate::services::monitor_state::SharedMonitorState;
use crate::services::telegram::Notifier;

/// What a single poll tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// A price was recorded; `alert` is set when the watch changed state
    Observed { price: f64, alert: Option<Alert> },
    /// The price source failed; nothing was recorded
    FetchFailed,
    /// Monitoring is switched off
    Paused,
}

/// Polls one symbol and pushes drop / reversal notifications
pub struct MonitorService {
    symbol: String,
    config: MonitorConfig,
    source: Arc<dyn PriceSource>,
    notifier: Arc<dyn Notifier>,
    session: MonitorSession,
    shared_state: SharedMonitorState,
}

impl MonitorService {
    pub fn new(
        symbol: String,
        config: MonitorConfig,
        source: Arc<dyn PriceSource>,
        notifier: Arc<dyn Notifier>,
        shared_state: SharedMonitorState,
    ) -> Self {
        let session = MonitorSession::new(&config);
        Self {
            symbol,
            config,
            source,
            notifier,
            session,
            shared_state,
        }
    }

    /// Start the monitoring loop
    pub async fn run(&mut self) {
        let mut ticker = interval(Duration::from_secs(self.config.poll_interval_secs));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            match self.tick(Utc::now()).await {
                TickOutcome::Observed {
                    price,
                    alert: Some(alert),
                } => tracing::debug!("{} raised at {}", alert.kind(), price),
                TickOutcome::Observed { .. } => {}
                TickOutcome::FetchFailed => {
                    tracing::debug!("Skipped tick for {}, retrying next interval", self.symbol)
                }
                TickOutcome::Paused => tracing::debug!("Monitoring paused, tick skipped"),
            }

            self.update_shared_state().await;
        }
    }

    /// Fetch one price, advance the session and deliver any alert
    pub async fn tick(&mut self, now: DateTime<Utc>) -> TickOutcome {
        if !self.shared_state.is_enabled() {
            return TickOutcome::Paused;
        }

        let price = match self.source.get_price(&self.symbol).await {
            Ok(price) => price,
            Err(e) => {
                tracing::error!("Failed to fetch price for {}: {}", self.symbol, e);
                return TickOutcome::FetchFailed;
            }
        };

        let alert = self.session.observe(now, price);
        self.log_observation(price);

        if let Some(ref alert) = alert {
            self.notify(alert).await;
        }

        TickOutcome::Observed { price, alert }
    }

    async fn notify(&self, alert: &Alert) {
        tracing::warn!("{} alert for {}", alert.kind(), self.symbol);

        let message = alert.message(&self.symbol);
        match self.notifier.send(&message).await {
            Ok(()) => tracing::info!("Notification sent ({})", alert.kind()),
            Err(e) => tracing::error!("Failed to send {} notification: {}", alert.kind(), e),
        }
    }

    fn log_observation(&self, price: f64) {
        match (self.session.last_change(), self.session.window_drop()) {
            (Some(change), Some(drop)) => tracing::info!(
                "{} price: ${} (change: {:+.2}, {}m change: {:+.2})",
                self.symbol,
                format_usd(price),
                change,
                self.config.retention_minutes,
                -drop
            ),
            _ => tracing::info!("{} price: ${}", self.symbol, format_usd(price)),
        }
    }

    async fn update_shared_state(&self) {
        let status = build_status(&self.symbol, &self.session, self.shared_state.is_enabled());
        let window = WindowResponse {
            observations: self.session.observations().to_vec(),
            bars: self.session.bars().to_vec(),
        };

        let snapshot = StatusSnapshot {
            as_of_ms: Utc::now().timestamp_millis() as u64,
            status: status.clone(),
        };

        *self.shared_state.status.write().await = status;
        *self.shared_state.window.write().await = window;
        let _ = self.shared_state.broadcaster.send(snapshot);
    }
}

fn build_status(symbol: &str, session: &MonitorSession, enabled: bool) -> MonitorStatus {
    let watch = session.watch();
    MonitorStatus {
        symbol: symbol.to_string(),
        state: session.state().into(),
        monitoring_enabled: enabled,
        last_price: session.last_price(),
        last_change: session.last_change(),
        window_drop: session.window_drop(),
        window_start: session.window_start(),
        watch_start: watch.map(|w| w.start),
        watch_end: watch.map(|w| w.end),
        last_alert: session.last_alert().map(|a| a.message(symbol)),
        summary: build_summary(symbol, session, enabled),
    }
}

fn build_summary(symbol: &str, session: &MonitorSession, enabled: bool) -> String {
    if !enabled {
        return format!("{symbol}: monitoring paused.");
    }

    let price = match session.last_price() {
        Some(price) => price,
        None => return format!("{symbol}: waiting for the first price."),
    };

    match (session.state(), session.watch()) {
        (WatchState::Watching, Some(watch)) => format!(
            "{symbol}: at ${}; watching for a reversal until {}.",
            format_usd(price),
            watch.end.format("%H:%M:%S")
        ),
        _ => match session.window_drop() {
            Some(drop) if drop > 0.0 => format!(
                "{symbol}: at ${}; down ${} across the window.",
                format_usd(price),
                format_usd(drop)
            ),
            Some(_) => format!(
                "{symbol}: at ${}; no drop across the window.",
                format_usd(price)
            ),
            None => format!("{symbol}: at ${}; collecting prices.", format_usd(price)),
        },
    }
}
