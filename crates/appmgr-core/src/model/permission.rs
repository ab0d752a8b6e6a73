use serde::{Deserialize, Serialize};

/// A permission attached to an app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub permission: String,
    #[serde(default)]
    pub granted: bool,
    /// Must be set from the settings panel, not the one-click consent flow
    #[serde(default)]
    pub restricted: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppPermissions {
    #[serde(default)]
    pub permissions: Vec<Permission>,
}

impl AppPermissions {
    pub fn get(&self, permission: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.permission == permission)
    }

    pub fn granted(&self) -> impl Iterator<Item = &Permission> {
        self.permissions.iter().filter(|p| p.granted)
    }
}
