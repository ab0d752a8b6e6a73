use serde::{Deserialize, Serialize};

/// An installed app with a newer version on offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpdate {
    pub id: String,
    pub name: String,
    /// Installed version, empty when there is no baseline
    #[serde(default)]
    pub current: String,
    pub available: String,
    #[serde(default)]
    pub publisher: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpdates {
    #[serde(default)]
    pub updates: Vec<PendingUpdate>,
}
