//! Version surface of an app: versions, tracks and preference layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A user or system version preference.
///
/// Empty strings mean unset. At most one field is expected to be non-empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionPreference {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub track: String,
}

impl VersionPreference {
    pub fn pinned(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            track: String::new(),
        }
    }

    pub fn following(track: impl Into<String>) -> Self {
        Self {
            version: String::new(),
            track: track.into(),
        }
    }

    /// Pinned version, if set.
    pub fn version(&self) -> Option<&str> {
        non_empty(&self.version)
    }

    /// Followed track, if set.
    pub fn track(&self) -> Option<&str> {
        non_empty(&self.track)
    }

    pub fn is_unset(&self) -> bool {
        self.version.is_empty() && self.track.is_empty()
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// Response of the app-versions query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppVersions {
    /// All known versions, oldest first
    #[serde(default)]
    pub versions: Vec<String>,

    /// Track name -> version
    #[serde(default)]
    pub tracks: BTreeMap<String, String>,

    #[serde(default)]
    pub default_track: String,

    #[serde(default)]
    pub user: Option<VersionPreference>,

    #[serde(default)]
    pub system: Option<VersionPreference>,

    #[serde(default)]
    pub is_admin: bool,

    /// Backend-reported track problem, empty when there is none
    #[serde(default)]
    pub track_warning: String,
}

impl AppVersions {
    pub fn has_multiple_versions(&self) -> bool {
        self.versions.len() > 1
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Apps with a single version and no tracks are not version-managed.
    pub fn is_versioned(&self) -> bool {
        self.has_multiple_versions() || self.has_tracks()
    }

    pub fn backend_warning(&self) -> Option<&str> {
        non_empty(&self.track_warning)
    }

    /// Versions newest first, as offered for pinning.
    pub fn versions_newest_first(&self) -> impl Iterator<Item = &str> {
        self.versions.iter().rev().map(|v| v.as_str())
    }
}

/// Whether the backend supports multiple installed versions per app.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiVersionAvailable {
    pub available: bool,
    #[serde(default)]
    pub version: String,
}
