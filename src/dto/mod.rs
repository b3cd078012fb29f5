mod aggregated_view;
mod announcement_item;
mod hidden_item;
mod identity;
mod item_kind;
mod notification_item;
mod push_status;

pub use aggregated_view::*;
pub use announcement_item::*;
pub use hidden_item::*;
pub use identity::*;
pub use item_kind::*;
pub use notification_item::*;
pub use push_status::*;
