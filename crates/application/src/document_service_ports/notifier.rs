use async_trait::async_trait;
use permdesk_domain::Notification;

/// Port for transient alerts shown to the person editing permissions.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Shows one alert. Delivery is best effort.
    async fn show_alert(&self, notification: Notification);
}
