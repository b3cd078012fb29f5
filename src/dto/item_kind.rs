use serde::Serialize;
use strum::{AsRefStr, IntoStaticStr};

///
/// Distinguishes personal notifications from broadcast announcements
/// wherever an operation accepts ids of either kind.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[strum(serialize = "notification")]
    Notification,

    #[strum(serialize = "announcement")]
    Announcement,
}

impl ItemKind {
    pub fn is_announcement(self) -> bool {
        self == ItemKind::Announcement
    }

    pub fn from_is_announcement(is_announcement: bool) -> Self {
        match is_announcement {
            true => ItemKind::Announcement,
            false => ItemKind::Notification,
        }
    }
}
