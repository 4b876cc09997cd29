#[derive(Debug, Clone)]
pub struct NotificationStoreConfig {
    /// Only this many most recent notifications are kept visible
    pub max_notifications: usize,
}
