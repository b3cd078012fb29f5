mod announcement_find_entity;
mod announcement_read_find_entity;
mod hidden_item_find_entity;
mod notification_find_entity;
mod student_find_entity;

pub use announcement_find_entity::*;
pub use announcement_read_find_entity::*;
pub use hidden_item_find_entity::*;
pub use notification_find_entity::*;
pub use student_find_entity::*;
