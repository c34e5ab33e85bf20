pub mod binance;
pub mod monitor;
pub mod monitor_state;
pub mod telegram;
