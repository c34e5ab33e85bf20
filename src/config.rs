use std::path::PathBuf;
use std::str::FromStr;

use crate::business_logic::config::MonitorConfig;
use crate::errors::ConfigError;

const DEFAULT_SYMBOL: &str = "BTCUSDT";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Process-level settings read from the environment
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub symbol: String,
    pub bind_addr: String,
    pub binance_api_key: Option<String>,
    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    /// Directory for the rolling log file; stdout only when unset
    pub log_dir: Option<PathBuf>,
    pub monitor: MonitorConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let mut monitor = MonitorConfig::default();
        if let Some(secs) = parse_optional(&get, "POLL_INTERVAL_SECS")? {
            monitor.poll_interval_secs = secs;
        }
        if let Some(threshold) = parse_optional(&get, "DROP_THRESHOLD")? {
            monitor.drop_threshold = threshold;
        }
        monitor.validate()?;

        Ok(Self {
            symbol: get("MONITOR_SYMBOL")
                .map(|s| s.trim().to_uppercase())
                .unwrap_or_else(|| DEFAULT_SYMBOL.to_string()),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            binance_api_key: get("BINANCE_API_KEY"),
            telegram_bot_token: require("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: require("TELEGRAM_CHAT_ID")?,
            log_dir: get("LOG_DIR").map(PathBuf::from),
            monitor,
        })
    }
}

fn parse_optional<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Unparsable { key, value }),
        None => Ok(None),
    }
}
