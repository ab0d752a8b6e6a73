//! Preference parsing - selection values and preference scopes.
//!
//! A version choice is carried as one of three tagged strings:
//! `default`, `track:<name>` or `version:<literal>`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::VersionPreference;

const TRACK_TAG: &str = "track:";
const VERSION_TAG: &str = "version:";
const DEFAULT_TAG: &str = "default";

/// Which preference layer a choice applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Personal override
    User,
    /// Admin default for users without an override
    System,
}

impl Scope {
    pub fn name(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A version choice as presented to the operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Selection {
    /// Clear the override
    #[default]
    Default,
    Track(String),
    Version(String),
}

impl Selection {
    /// Decode a tagged value. Malformed input decodes to `Default`.
    pub fn decode(value: &str) -> Self {
        if let Some(track) = value.strip_prefix(TRACK_TAG) {
            if !track.is_empty() {
                return Self::Track(track.to_string());
            }
        } else if let Some(version) = value.strip_prefix(VERSION_TAG) {
            if !version.is_empty() {
                return Self::Version(version.to_string());
            }
        }
        Self::Default
    }

    pub fn encode(&self) -> String {
        match self {
            Self::Default => DEFAULT_TAG.to_string(),
            Self::Track(track) => format!("{}{}", TRACK_TAG, track),
            Self::Version(version) => format!("{}{}", VERSION_TAG, version),
        }
    }

    /// Current selection for a stored preference.
    ///
    /// A record carrying both fields reads as its pinned version, the same
    /// precedence the version resolver applies.
    pub fn from_preference(pref: Option<&VersionPreference>) -> Self {
        match pref {
            Some(p) if p.version().is_some() => Self::Version(p.version.clone()),
            Some(p) if p.track().is_some() => Self::Track(p.track.clone()),
            _ => Self::Default,
        }
    }

    /// Request fields to send. The cleared field is always the empty string,
    /// never omitted, so the backend can tell "unset" from "unchanged".
    pub fn to_preference(&self) -> VersionPreference {
        match self {
            Self::Default => VersionPreference::default(),
            Self::Track(track) => VersionPreference::following(track.clone()),
            Self::Version(version) => VersionPreference::pinned(version.clone()),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Self::decode(value)
    }
}
