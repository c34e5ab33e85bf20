use chrono::{DateTime, Utc};

use crate::business_logic::alert::Alert;
use crate::business_logic::config::MonitorConfig;
use crate::business_logic::drop_watch::{DropWatch, Watch, WatchState};
use crate::business_logic::reversal::ReversalDetector;
use crate::business_logic::window::PriceWindow;
use crate::models::observation::{Bar, Observation};

/// All in-memory state for monitoring one symbol.
/// Owned by a single task; nothing here is shared or persisted.
#[derive(Debug, Clone)]
pub struct MonitorSession {
    window: PriceWindow,
    detector: ReversalDetector,
    drop_watch: DropWatch,
    last_alert: Option<Alert>,
}

impl MonitorSession {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            window: PriceWindow::new(config),
            detector: ReversalDetector::new(config),
            drop_watch: DropWatch::new(config),
            last_alert: None,
        }
    }

    /// Fold one price sample into the windows and run the watch machine
    pub fn observe(&mut self, now: DateTime<Utc>, price: f64) -> Option<Alert> {
        self.window.append_observation(now, price);

        let alert = self
            .drop_watch
            .on_observation(now, price, &self.window, &self.detector);
        if let Some(ref alert) = alert {
            self.last_alert = Some(alert.clone());
        }
        alert
    }

    pub fn last_price(&self) -> Option<f64> {
        self.window.latest().map(|o| o.price)
    }

    /// Change against the sample before the latest one
    pub fn last_change(&self) -> Option<f64> {
        let latest = self.window.latest()?;
        let previous = self.window.previous()?;
        Some(latest.price - previous.price)
    }

    /// Drop across the retained window at the latest price
    pub fn window_drop(&self) -> Option<f64> {
        let latest = self.window.latest()?;
        self.window.drop_since_oldest(latest.price)
    }

    pub fn window_start(&self) -> Option<DateTime<Utc>> {
        self.window.oldest().map(|o| o.timestamp)
    }

    pub fn state(&self) -> WatchState {
        self.drop_watch.state()
    }

    pub fn watch(&self) -> Option<Watch> {
        self.drop_watch.watch()
    }

    pub fn last_alert(&self) -> Option<&Alert> {
        self.last_alert.as_ref()
    }

    pub fn observations(&self) -> &[Observation] {
        self.window.observations()
    }

    pub fn bars(&self) -> &[Bar] {
        self.window.bars()
    }
}
