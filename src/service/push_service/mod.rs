mod dto;
mod mongo_push_feed;
mod push_feed;
mod push_subscription;

pub use dto::{PushEvent, PushFeedConfig};
pub use mongo_push_feed::*;
pub use push_feed::*;
pub use push_subscription::*;
