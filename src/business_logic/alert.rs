/// Notification raised on a watch transition
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Price fell past the threshold and a watch was armed
    DropDetected {
        elapsed_minutes: i64,
        drop: f64,
        price: f64,
        watch_minutes: i64,
    },
    /// Reversal pattern appeared while watching
    ReversalConfirmed { price: f64, explanation: String },
    /// Watch ran out without a reversal
    WatchExpired { price: f64, watch_minutes: i64 },
}

impl Alert {
    pub fn kind(&self) -> &'static str {
        match self {
            Alert::DropDetected { .. } => "drop_detected",
            Alert::ReversalConfirmed { .. } => "reversal_confirmed",
            Alert::WatchExpired { .. } => "watch_expired",
        }
    }

    /// Text pushed to the notifier
    pub fn message(&self, symbol: &str) -> String {
        match self {
            Alert::DropDetected {
                elapsed_minutes,
                drop,
                price,
                watch_minutes,
            } => format!(
                "⚠️ {symbol} price alert!\n\
                 Down ${drop:.2} over the last {elapsed_minutes} minutes.\n\
                 Current price: ${}\n\n\
                 Monitoring buy entry conditions for the next {watch_minutes} minutes.",
                format_usd(*price)
            ),
            Alert::ReversalConfirmed { price, explanation } => format!(
                "✅ Buy entry conditions met!\nCurrent price: ${}\n\n{explanation}",
                format_usd(*price)
            ),
            Alert::WatchExpired {
                price,
                watch_minutes,
            } => format!(
                "❌ Buy entry monitoring ended\n\
                 Conditions were not met within {watch_minutes} minutes.\n\
                 Current price: ${}",
                format_usd(*price)
            ),
        }
    }
}

/// Two decimals with thousands separators, e.g. `48,900.50`
pub fn format_usd(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_usd_groups_thousands() {
        assert_eq!(format_usd(0.0), "0.00");
        assert_eq!(format_usd(999.999), "1,000.00");
        assert_eq!(format_usd(48_900.5), "48,900.50");
        assert_eq!(format_usd(1_234_567.891), "1,234,567.89");
        assert_eq!(format_usd(-1_050.0), "-1,050.00");
    }

    #[test]
    fn test_drop_message_lists_window_and_price() {
        let alert = Alert::DropDetected {
            elapsed_minutes: 12,
            drop: 1100.0,
            price: 48_900.0,
            watch_minutes: 30,
        };

        assert_eq!(
            alert.message("BTCUSDT"),
            "⚠️ BTCUSDT price alert!\n\
             Down $1100.00 over the last 12 minutes.\n\
             Current price: $48,900.00\n\n\
             Monitoring buy entry conditions for the next 30 minutes."
        );
    }

    #[test]
    fn test_success_message_embeds_explanation() {
        let alert = Alert::ReversalConfirmed {
            price: 49_010.0,
            explanation: "analysis".to_string(),
        };

        assert_eq!(
            alert.message("BTCUSDT"),
            "✅ Buy entry conditions met!\nCurrent price: $49,010.00\n\nanalysis"
        );
        assert_eq!(alert.kind(), "reversal_confirmed");
    }

    #[test]
    fn test_expiry_message_reports_price() {
        let alert = Alert::WatchExpired {
            price: 48_000.0,
            watch_minutes: 30,
        };

        assert_eq!(
            alert.message("BTCUSDT"),
            "❌ Buy entry monitoring ended\n\
             Conditions were not met within 30 minutes.\n\
             Current price: $48,000.00"
        );
    }
}
