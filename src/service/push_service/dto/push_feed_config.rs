pub struct PushFeedConfig {
    /// Number of events buffered before change streams are paused
    pub buffer_size: usize,
}
