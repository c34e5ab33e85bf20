pub mod alert;
pub mod config;
pub mod drop_watch;
pub mod reversal;
pub mod session;
pub mod window;
