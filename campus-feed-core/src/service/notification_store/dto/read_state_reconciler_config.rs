use std::time::Duration;

pub struct ReadStateReconcilerConfig {
    pub interval: Duration,
}
