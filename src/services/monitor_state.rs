use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::models::status::{MonitorStatus, StatusSnapshot, WindowResponse};

#[derive(Debug)]
pub struct MonitorStateInner {
    pub status: RwLock<MonitorStatus>,
    pub window: RwLock<WindowResponse>,
    pub broadcaster: broadcast::Sender<StatusSnapshot>,
    enabled: AtomicBool,
}

impl MonitorStateInner {
    pub fn new(symbol: &str) -> Self {
        let (broadcaster, _receiver) = broadcast::channel(16);
        Self {
            status: RwLock::new(MonitorStatus::starting(symbol)),
            window: RwLock::new(WindowResponse::default()),
            broadcaster,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }
}

pub type SharedMonitorState = Arc<MonitorStateInner>;
