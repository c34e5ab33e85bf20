use chrono::Duration;

use crate::errors::ConfigError;

/// Configuration parameters for drop detection and reversal monitoring
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Seconds between price polls
    pub poll_interval_secs: u64,
    /// Lookback length for raw observations and bars, in minutes
    pub retention_minutes: i64,
    /// Bar bucket width in minutes (clock aligned, must divide the hour)
    pub bar_minutes: i64,
    /// How long a watch stays open after a drop, in minutes
    pub watch_minutes: i64,
    /// Absolute drop across the window that arms a watch
    pub drop_threshold: f64,
    /// Max close-to-close move still counted as stabilizing
    pub stabilizing_band: f64,
    /// Min (close - low) / (high - low) on the last bar
    pub lower_tail_ratio: f64,
    /// Bars inspected by the reversal check
    pub pattern_bars: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            retention_minutes: 30,
            bar_minutes: 5,
            watch_minutes: 30,
            drop_threshold: 1000.0,
            stabilizing_band: 100.0,
            lower_tail_ratio: 0.3,
            pattern_bars: 3,
        }
    }
}

impl MonitorConfig {
    pub fn retention(&self) -> Duration {
        Duration::minutes(self.retention_minutes)
    }

    pub fn bar_span(&self) -> Duration {
        Duration::minutes(self.bar_minutes)
    }

    pub fn watch_span(&self) -> Duration {
        Duration::minutes(self.watch_minutes)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll interval must be positive".into()));
        }
        if self.retention_minutes <= 0 || self.watch_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "retention and watch spans must be positive".into(),
            ));
        }
        if self.bar_minutes <= 0 || 60 % self.bar_minutes != 0 {
            return Err(ConfigError::Invalid(format!(
                "bar span of {} minutes does not divide the hour",
                self.bar_minutes
            )));
        }
        // NaN fails every comparison, so test for the accepted range
        if !(self.drop_threshold > 0.0 && self.drop_threshold.is_finite()) {
            return Err(ConfigError::Invalid(
                "drop threshold must be a positive number".into(),
            ));
        }
        if !(self.stabilizing_band >= 0.0 && self.stabilizing_band.is_finite()) {
            return Err(ConfigError::Invalid(
                "stabilizing band must be a non-negative number".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.lower_tail_ratio) {
            return Err(ConfigError::Invalid(
                "lower tail ratio must be within 0..=1".into(),
            ));
        }
        if self.pattern_bars < 2 {
            return Err(ConfigError::Invalid(
                "reversal check needs at least 2 bars".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MonitorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bar_span_not_dividing_hour() {
        let config = MonitorConfig {
            bar_minutes: 7,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_single_bar_lookback() {
        let config = MonitorConfig {
            pattern_bars: 1,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_limits() {
        for bad in [f64::NAN, f64::INFINITY] {
            let config = MonitorConfig {
                drop_threshold: bad,
                ..MonitorConfig::default()
            };
            assert!(config.validate().is_err(), "drop threshold {bad}");

            let config = MonitorConfig {
                stabilizing_band: bad,
                ..MonitorConfig::default()
            };
            assert!(config.validate().is_err(), "stabilizing band {bad}");
        }

        let config = MonitorConfig {
            lower_tail_ratio: f64::NAN,
            ..MonitorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
