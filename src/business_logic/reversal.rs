use crate::business_logic::config::MonitorConfig;
use crate::models::observation::Bar;

pub const INSUFFICIENT_DATA: &str = "insufficient data";

const PASS: &str = "✅";
const FAIL: &str = "❌";

/// Outcome of each reversal condition on the latest bars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReversalChecks {
    /// Every body strictly shorter than the one before it
    pub decreasing_length: bool,
    /// Last close within the band of, or above, the previous close
    pub price_stabilizing: bool,
    /// Last bar closed well off its low
    pub lower_tail: bool,
}

impl ReversalChecks {
    pub fn all_met(&self) -> bool {
        self.decreasing_length && self.price_stabilizing && self.lower_tail
    }

    /// Header plus one line per condition, in fixed order
    pub fn explanation(&self) -> String {
        format!(
            "Buy entry condition analysis:\n\
             1. Decreasing candle length: {}\n\
             2. Price stabilizing: {}\n\
             3. Lower tail formed: {}",
            marker(self.decreasing_length),
            marker(self.price_stabilizing),
            marker(self.lower_tail)
        )
    }
}

fn marker(passed: bool) -> &'static str {
    if passed {
        PASS
    } else {
        FAIL
    }
}

/// Checks the latest bars for a bottoming pattern after a sharp drop
#[derive(Debug, Clone)]
pub struct ReversalDetector {
    lookback: usize,
    stabilizing_band: f64,
    lower_tail_ratio: f64,
}

impl ReversalDetector {
    pub fn new(config: &MonitorConfig) -> Self {
        Self {
            lookback: config.pattern_bars,
            stabilizing_band: config.stabilizing_band,
            lower_tail_ratio: config.lower_tail_ratio,
        }
    }

    /// Verdict and explanation for the bar sequence.
    /// Fewer bars than the lookback gives `(false, "insufficient data")`.
    pub fn evaluate(&self, bars: &[Bar]) -> (bool, String) {
        match self.check(bars) {
            Some(checks) => (checks.all_met(), checks.explanation()),
            None => (false, INSUFFICIENT_DATA.to_string()),
        }
    }

    pub fn check(&self, bars: &[Bar]) -> Option<ReversalChecks> {
        if bars.len() < self.lookback {
            return None;
        }
        let recent = &bars[bars.len() - self.lookback..];
        let (prev, last) = match recent {
            [.., prev, last] => (prev, last),
            _ => return None,
        };

        let decreasing_length = recent
            .windows(2)
            .all(|pair| pair[0].body_len() > pair[1].body_len());

        let price_stabilizing =
            (last.close - prev.close).abs() < self.stabilizing_band || last.close > prev.close;

        let total = last.range();
        let lower_tail = if total > 0.0 {
            (last.close - last.low) / total >= self.lower_tail_ratio
        } else {
            false
        };

        Some(ReversalChecks {
            decreasing_length,
            price_stabilizing,
            lower_tail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn make_bar(idx: i64, open: f64, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            bucket_start: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
                + Duration::minutes(5 * idx),
            open,
            high,
            low,
            close,
        }
    }

    fn detector() -> ReversalDetector {
        ReversalDetector::new(&MonitorConfig::default())
    }

    fn bottoming_bars() -> Vec<Bar> {
        vec![
            make_bar(0, 5050.0, 5060.0, 4995.0, 5000.0), // body 50
            make_bar(1, 5030.0, 5040.0, 4990.0, 5000.0), // body 30
            make_bar(2, 5000.0, 5020.0, 4990.0, 5010.0), // body 10
        ]
    }

    #[test]
    fn test_too_few_bars_is_insufficient_data() {
        let detector = detector();
        let bars = bottoming_bars();

        assert_eq!(detector.evaluate(&[]), (false, "insufficient data".to_string()));
        assert_eq!(
            detector.evaluate(&bars[..2]),
            (false, "insufficient data".to_string())
        );
        assert!(detector.check(&bars[..2]).is_none());
    }

    #[test]
    fn test_bottoming_sequence_meets_all_conditions() {
        let (met, explanation) = detector().evaluate(&bottoming_bars());

        assert!(met);
        assert_eq!(
            explanation,
            "Buy entry condition analysis:\n\
             1. Decreasing candle length: ✅\n\
             2. Price stabilizing: ✅\n\
             3. Lower tail formed: ✅"
        );
    }

    #[test]
    fn test_only_last_bars_are_inspected() {
        let mut bars = vec![make_bar(-1, 100.0, 100.0, 100.0, 100.0)];
        bars.extend(bottoming_bars());

        assert!(detector().evaluate(&bars).0);
    }

    #[test]
    fn test_equal_bodies_are_not_decreasing() {
        let mut bars = bottoming_bars();
        bars[1].open = 5020.0; // body 20
        bars[2].open = 5030.0; // body 20

        let checks = detector().check(&bars).unwrap();
        assert!(!checks.decreasing_length);
        assert!(!checks.all_met());
    }

    #[test]
    fn test_stabilizing_accepts_small_fall_rejects_large_one() {
        let detector = detector();
        let mut bars = bottoming_bars();

        bars[2] = make_bar(2, 4999.0, 5000.0, 4900.0, 4991.0);
        assert!(detector.check(&bars).unwrap().price_stabilizing);

        bars[2] = make_bar(2, 4905.0, 4920.0, 4890.0, 4900.0);
        assert!(!detector.check(&bars).unwrap().price_stabilizing);
    }

    #[test]
    fn test_large_rise_still_counts_as_stabilizing() {
        let mut bars = bottoming_bars();
        bars[2] = make_bar(2, 5495.0, 5500.0, 5400.0, 5500.0);

        assert!(detector().check(&bars).unwrap().price_stabilizing);
    }

    #[test]
    fn test_close_near_low_has_no_lower_tail() {
        let mut bars = bottoming_bars();
        // tail 5 of range 30
        bars[2] = make_bar(2, 5000.0, 5020.0, 4990.0, 4995.0);

        let checks = detector().check(&bars).unwrap();
        assert!(!checks.lower_tail);
        assert_eq!(
            checks.explanation(),
            "Buy entry condition analysis:\n\
             1. Decreasing candle length: ✅\n\
             2. Price stabilizing: ✅\n\
             3. Lower tail formed: ❌"
        );
    }

    #[test]
    fn test_flat_bar_has_no_lower_tail() {
        let mut bars = bottoming_bars();
        bars[2] = make_bar(2, 5000.0, 5000.0, 5000.0, 5000.0);

        assert!(!detector().check(&bars).unwrap().lower_tail);
    }

    #[test]
    fn test_tail_at_ratio_boundary() {
        let mut bars = vec![
            make_bar(0, 150.0, 160.0, 95.0, 100.0), // body 50
            make_bar(1, 130.0, 140.0, 95.0, 100.0), // body 30
        ];
        // tail 3 of range 10
        bars.push(make_bar(2, 102.0, 110.0, 100.0, 103.0));

        let checks = detector().check(&bars).unwrap();
        assert!(checks.lower_tail);
        assert!(checks.all_met());
    }
}
