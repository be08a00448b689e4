// OS notification delivery - a thin wrapper over the desktop notification bus
// Failure here is warning material for the caller, never fatal.

use larder_core::{Error, Notifier, Result};
use notify_rust::Notification;
use std::time::Duration;
use tracing::debug;

/// Sends expiry alerts through the desktop notification service.
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str, timeout_secs: u32) -> Result<()> {
        debug!(title, message, "sending desktop notification");
        Notification::new()
            .summary(title)
            .body(message)
            .timeout(Duration::from_secs(u64::from(timeout_secs)))
            .show()
            .map_err(|e| Error::Notification(e.to_string()))?;
        Ok(())
    }
}
