//! Installed and market app records.

use serde::{Deserialize, Serialize};

/// An installed (or development) app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledApp {
    /// Stable content-derived identifier
    pub id: String,

    pub name: String,

    /// Latest installed version
    #[serde(default)]
    pub latest: String,

    /// Provenance marker, empty for development apps
    #[serde(default)]
    pub fingerprint: String,

    /// Track the current user follows, if any
    #[serde(default)]
    pub user_track: Option<String>,

    /// Declared classes
    #[serde(default)]
    pub classes: Vec<String>,

    /// Declared services
    #[serde(default)]
    pub services: Vec<String>,

    /// Declared HTTP paths (without leading slash)
    #[serde(default)]
    pub paths: Vec<String>,
}

impl InstalledApp {
    /// Whether the app declares any routable capability.
    pub fn has_capabilities(&self) -> bool {
        !(self.classes.is_empty() && self.services.is_empty() && self.paths.is_empty())
    }

    /// Case-insensitive search over name and id.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query) || self.id.to_lowercase().contains(&query)
    }
}

/// Response of the installed-apps listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledApps {
    #[serde(default)]
    pub installed: Vec<InstalledApp>,

    #[serde(default)]
    pub development: Vec<InstalledApp>,

    /// Whether the caller may install apps
    #[serde(default)]
    pub can_install: bool,
}

impl InstalledApps {
    /// Find an app among installed, then development apps.
    pub fn find(&self, id: &str) -> Option<&InstalledApp> {
        self.installed
            .iter()
            .chain(self.development.iter())
            .find(|a| a.id == id)
    }

    /// All apps, installed first.
    pub fn all(&self) -> impl Iterator<Item = &InstalledApp> {
        self.installed.iter().chain(self.development.iter())
    }
}

/// An app listed in the market.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketApp {
    pub id: String,
    #[serde(default)]
    pub language: String,
    pub name: String,
    #[serde(default)]
    pub blurb: String,
    #[serde(default)]
    pub description: String,
}

impl MarketApp {
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.id.to_lowercase().contains(&query)
            || self.blurb.to_lowercase().contains(&query)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_track: String,
}

/// A published track and the version it currently points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub track: String,
    pub version: String,
}

/// Publisher information for an installable app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppInformation {
    pub app: AppInfo,
    #[serde(default)]
    pub fingerprint: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

impl AppInformation {
    /// Version the app's default track points at.
    pub fn default_version(&self) -> Option<&str> {
        self.tracks
            .iter()
            .find(|t| t.track == self.app.default_track)
            .map(|t| t.version.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallOutcome {
    pub installed: bool,
    pub id: String,
    pub version: String,
}
