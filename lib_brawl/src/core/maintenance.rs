//! Upstream maintenance state machine.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::core::events::BrawlEvent;

/// Status the API answers with while it is down for maintenance.
pub const MAINTENANCE_STATUS: u16 = 503;

/// Tracks whether the API is in maintenance, from probe status codes.
#[derive(Debug, Default)]
pub struct MaintenanceMonitor {
    active: AtomicBool,
}

impl MaintenanceMonitor {
    /// Starts outside maintenance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the last transition entered maintenance.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Feeds one probe result; returns the event for a state transition.
    ///
    /// Only 503 enters and only 200 leaves; every other status is ignored.
    pub fn observe(&self, status: u16) -> Option<BrawlEvent> {
        match status {
            MAINTENANCE_STATUS => (!self.active.swap(true, Ordering::SeqCst)).then_some(BrawlEvent::MaintenanceStart),
            200 => self.active.swap(false, Ordering::SeqCst).then_some(BrawlEvent::MaintenanceEnd),
            _ => None,
        }
    }
}
