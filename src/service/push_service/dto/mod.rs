mod push_event;
mod push_feed_config;

pub use push_event::*;
pub use push_feed_config::*;
