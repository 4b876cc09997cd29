pub struct NotificationsProducerServiceConfig {
    pub max_title_len: usize,
    pub max_body_len: usize,
}
