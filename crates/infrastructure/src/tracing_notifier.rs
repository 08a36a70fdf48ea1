//! Notifier that writes alerts to tracing output, for headless runs.

use async_trait::async_trait;
use permdesk_application::Notifier;
use permdesk_domain::Notification;
use tracing::{info, warn};

/// Headless notifier that logs alerts instead of displaying them.
#[derive(Clone)]
pub struct TracingNotifier;

impl TracingNotifier {
    /// Creates a new tracing notifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for TracingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for TracingNotifier {
    async fn show_alert(&self, notification: Notification) {
        if notification.indicator.is_success() {
            info!(
                indicator = notification.indicator.as_str(),
                duration_seconds = notification.duration_seconds,
                "{}",
                notification.message
            );
        } else {
            warn!(
                indicator = notification.indicator.as_str(),
                duration_seconds = notification.duration_seconds,
                "{}",
                notification.message
            );
        }
    }
}
