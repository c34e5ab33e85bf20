use chrono::{DateTime, Duration, DurationRound, Utc};

use crate::business_logic::config::MonitorConfig;
use crate::models::observation::{Bar, Observation};

/// Time-bounded raw price samples plus their clock-aligned bars
#[derive(Debug, Clone)]
pub struct PriceWindow {
    retention: Duration,
    bar_span: Duration,
    observations: Vec<Observation>,
    bars: Vec<Bar>,
}

impl PriceWindow {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            retention: config.retention(),
            bar_span: config.bar_span(),
            observations: Vec::new(),
            bars: Vec::new(),
        }
    }

    /// Record a price sampled at `timestamp`, then evict everything outside the
    /// retention horizon measured back from `timestamp`.
    ///
    /// Timestamps must be strictly increasing across calls.
    pub fn append_observation(&mut self, timestamp: DateTime<Utc>, price: f64) {
        self.observations.push(Observation { timestamp, price });
        self.fold_into_bars(timestamp, price);

        let cutoff = timestamp - self.retention;
        let before = (self.observations.len(), self.bars.len());
        self.observations.retain(|o| o.timestamp > cutoff);
        self.bars.retain(|b| b.bucket_start > cutoff);

        let evicted = (
            before.0 - self.observations.len(),
            before.1 - self.bars.len(),
        );
        if evicted != (0, 0) {
            tracing::debug!(
                "Evicted {} observations and {} bars older than {}",
                evicted.0,
                evicted.1,
                cutoff
            );
        }
    }

    fn fold_into_bars(&mut self, timestamp: DateTime<Utc>, price: f64) {
        let bucket_start = self.bucket_start(timestamp);

        match self.bars.last_mut() {
            Some(bar) if bar.bucket_start == bucket_start => bar.absorb(price),
            _ => self.bars.push(Bar::opened_at(bucket_start, price)),
        }
    }

    /// Truncate `timestamp` to the preceding bar boundary
    pub fn bucket_start(&self, timestamp: DateTime<Utc>) -> DateTime<Utc> {
        match timestamp.duration_trunc(self.bar_span) {
            Ok(start) => start,
            Err(e) => {
                tracing::debug!("Cannot align {} to bar span: {}", timestamp, e);
                timestamp
            }
        }
    }

    /// Oldest retained price minus `current_price`; positive means the price fell.
    /// `None` until the window holds at least two observations.
    pub fn drop_since_oldest(&self, current_price: f64) -> Option<f64> {
        if self.observations.len() < 2 {
            return None;
        }
        self.oldest().map(|o| o.price - current_price)
    }

    pub fn oldest(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn latest(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// The observation recorded just before the latest one
    pub fn previous(&self) -> Option<&Observation> {
        self.observations.iter().rev().nth(1)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, minute, second).unwrap()
    }

    fn window() -> PriceWindow {
        PriceWindow::new(&MonitorConfig::default())
    }

    #[test]
    fn test_same_bucket_observations_fold_into_one_bar() {
        let mut window = window();
        window.append_observation(at(12, 0, 10), 100.0);
        window.append_observation(at(12, 1, 10), 105.0);
        window.append_observation(at(12, 2, 10), 95.0);

        assert_eq!(window.bars().len(), 1);
        let bar = window.bars()[0];
        assert_eq!(bar.bucket_start, at(12, 0, 0));
        assert_eq!(bar.open, 100.0);
        assert_eq!(bar.high, 105.0);
        assert_eq!(bar.low, 95.0);
        assert_eq!(bar.close, 95.0);
    }

    #[test]
    fn test_bucket_boundary_starts_new_bar() {
        let mut window = window();
        window.append_observation(at(12, 4, 59), 100.0);
        window.append_observation(at(12, 5, 0), 101.0);

        let starts: Vec<_> = window.bars().iter().map(|b| b.bucket_start).collect();
        assert_eq!(starts, vec![at(12, 0, 0), at(12, 5, 0)]);
        assert_eq!(window.bars()[1].open, 101.0);
    }

    #[test]
    fn test_evicts_entries_outside_retention() {
        let mut window = window();
        for minute in 0..50 {
            let now = at(12, 0, 30) + Duration::minutes(minute);
            window.append_observation(now, 1000.0 + minute as f64);

            let cutoff = now - Duration::minutes(30);
            assert!(window.observations().iter().all(|o| o.timestamp > cutoff));
            assert!(window.bars().iter().all(|b| b.bucket_start > cutoff));
        }

        // 12:49:30 keeps samples from 12:20:30 onward
        assert_eq!(window.observations().len(), 30);
        assert_eq!(window.oldest().map(|o| o.price), Some(1020.0));
        // bars starting at 12:20 and later survive; 12:20 itself is past the cutoff
        assert_eq!(window.bars().first().map(|b| b.bucket_start), Some(at(12, 20, 0)));
    }

    #[test]
    fn test_sample_exactly_at_horizon_is_evicted() {
        let mut window = window();
        window.append_observation(at(12, 0, 0), 100.0);
        window.append_observation(at(12, 30, 0), 90.0);

        assert_eq!(window.observations().len(), 1);
        assert_eq!(window.drop_since_oldest(90.0), None);
    }

    #[test]
    fn test_drop_needs_two_observations() {
        let mut window = window();
        assert_eq!(window.drop_since_oldest(100.0), None);

        window.append_observation(at(12, 0, 0), 50_000.0);
        assert_eq!(window.drop_since_oldest(50_000.0), None);

        window.append_observation(at(12, 1, 0), 48_900.0);
        assert_eq!(window.drop_since_oldest(48_900.0), Some(1100.0));
        assert_eq!(window.previous().map(|o| o.price), Some(50_000.0));
        assert_eq!(window.latest().map(|o| o.price), Some(48_900.0));
    }

    #[test]
    fn test_rise_yields_negative_drop() {
        let mut window = window();
        window.append_observation(at(12, 0, 0), 100.0);
        window.append_observation(at(12, 1, 0), 150.0);

        assert_eq!(window.drop_since_oldest(150.0), Some(-50.0));
    }
}
