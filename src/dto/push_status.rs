use serde::Serialize;
use strum::AsRefStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsRefStr, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PushStatus {
    /// No identity or no view loaded yet
    #[default]
    #[strum(serialize = "inactive")]
    Inactive,

    #[strum(serialize = "live")]
    Live,

    /// Push channel could not be established or ended unexpectedly.
    /// View is only updated by explicit refresh.
    #[strum(serialize = "degraded")]
    Degraded,
}
