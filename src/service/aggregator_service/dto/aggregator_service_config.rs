use std::time::Duration;

#[derive(Clone)]
pub struct AggregatorServiceConfig {
    /// Upper bound of every single backend call
    pub request_timeout: Duration,

    /// Attempts of read calls made by load. Writes are never retried.
    pub load_retry_max_count: u8,
    pub load_retry_interval: Duration,

    pub resort_interval: Duration,
}
