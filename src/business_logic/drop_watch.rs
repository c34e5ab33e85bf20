use chrono::{DateTime, Duration, Utc};

use crate::business_logic::alert::Alert;
use crate::business_logic::config::MonitorConfig;
use crate::business_logic::reversal::ReversalDetector;
use crate::business_logic::window::PriceWindow;

/// Drop monitoring state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    /// Waiting for a drop past the threshold
    Idle,
    /// Drop seen, checking bars for a reversal until the watch ends
    Watching,
}

/// An open reversal watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watch {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Arms a watch on a sharp drop and closes it on reversal or timeout.
/// At most one watch is open; drops while watching are ignored.
#[derive(Debug, Clone)]
pub struct DropWatch {
    drop_threshold: f64,
    watch_span: Duration,
    watch: Option<Watch>,
}

impl DropWatch {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            drop_threshold: config.drop_threshold,
            watch_span: config.watch_span(),
            watch: None,
        }
    }

    /// Advance the machine after `price` observed at `now` was appended to `window`
    pub fn on_observation(
        &mut self,
        now: DateTime<Utc>,
        price: f64,
        window: &PriceWindow,
        detector: &ReversalDetector,
    ) -> Option<Alert> {
        let drop = window.drop_since_oldest(price)?;

        let watch = match self.watch {
            Some(watch) => watch,
            None => return self.try_arm(now, price, drop, window),
        };

        let (met, explanation) = detector.evaluate(window.bars());
        if met {
            tracing::info!("Reversal pattern confirmed at {}", price);
            self.watch = None;
            return Some(Alert::ReversalConfirmed { price, explanation });
        }

        if now >= watch.end {
            tracing::info!("Watch opened at {} expired without reversal", watch.start);
            self.watch = None;
            return Some(Alert::WatchExpired {
                price,
                watch_minutes: self.watch_span.num_minutes(),
            });
        }

        tracing::debug!(
            "Still watching until {}: {}",
            watch.end,
            explanation.replace('\n', " ")
        );
        None
    }

    fn try_arm(
        &mut self,
        now: DateTime<Utc>,
        price: f64,
        drop: f64,
        window: &PriceWindow,
    ) -> Option<Alert> {
        if drop < self.drop_threshold {
            return None;
        }

        let watch = Watch {
            start: now,
            end: now + self.watch_span,
        };
        self.watch = Some(watch);

        let elapsed_minutes = window
            .oldest()
            .map(|o| (now - o.timestamp).num_minutes())
            .unwrap_or(0);

        tracing::info!(
            "Drop of {:.2} detected, watching for reversal until {}",
            drop,
            watch.end
        );

        Some(Alert::DropDetected {
            elapsed_minutes,
            drop,
            price,
            watch_minutes: self.watch_span.num_minutes(),
        })
    }

    pub fn state(&self) -> WatchState {
        match self.watch {
            Some(_) => WatchState::Watching,
            None => WatchState::Idle,
        }
    }

    pub fn watch(&self) -> Option<Watch> {
        self.watch
    }
}
