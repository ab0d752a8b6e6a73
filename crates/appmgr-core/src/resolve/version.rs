//! Version resolver - which concrete version a user session runs.
//!
//! Layers are consulted in a fixed order and the first that applies wins:
//!
//! 1. user pinned version
//! 2. user track (must exist in `tracks`)
//! 3. system pinned version
//! 4. system track (must exist in `tracks`)
//! 5. the app's default track
//!
//! A track preference naming a track that no longer exists stops resolution
//! at that layer and carries a [`TrackWarning`]; it is never treated as if
//! the preference were unset.

use std::collections::BTreeMap;
use std::fmt;

use crate::model::{AppVersions, VersionPreference};
use crate::preference::Scope;

/// Which rule produced the effective version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolutionSource {
    UserVersion,
    UserTrack,
    SystemVersion,
    SystemTrack,
    DefaultTrack,
    None,
}

impl ResolutionSource {
    fn pinned(scope: Scope) -> Self {
        match scope {
            Scope::User => Self::UserVersion,
            Scope::System => Self::SystemVersion,
        }
    }

    fn track(scope: Scope) -> Self {
        match scope {
            Scope::User => Self::UserTrack,
            Scope::System => Self::SystemTrack,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::UserVersion => "user-version",
            Self::UserTrack => "user-track",
            Self::SystemVersion => "system-version",
            Self::SystemTrack => "system-track",
            Self::DefaultTrack => "default-track",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A preference that points at a track the app no longer publishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackWarning {
    pub scope: Scope,
    pub track: String,
}

impl fmt::Display for TrackWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} preference follows track '{}', which no longer exists; select a new version",
            self.scope, self.track
        )
    }
}

/// Outcome of version resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub source: ResolutionSource,
    /// Effective version, `None` when unversioned or the track is stale
    pub value: Option<String>,
    /// Track consulted, for track-based sources
    pub track: Option<String>,
    pub warning: Option<TrackWarning>,
}

impl Resolution {
    fn unresolved() -> Self {
        Self {
            source: ResolutionSource::None,
            value: None,
            track: None,
            warning: None,
        }
    }

    pub fn version(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn is_stale(&self) -> bool {
        self.warning.is_some()
    }

    /// Human-facing explanation of the result.
    pub fn label(&self) -> String {
        if let Some(warning) = &self.warning {
            return format!("track {} no longer exists", warning.track);
        }
        let version = self.value.as_deref().unwrap_or_default();
        let track = self.track.as_deref().unwrap_or_default();
        match self.source {
            ResolutionSource::UserVersion => format!("pinned to version {}", version),
            ResolutionSource::UserTrack => {
                format!("following track {} (version {})", track, version)
            }
            ResolutionSource::SystemVersion => format!("system default version {}", version),
            ResolutionSource::SystemTrack => {
                format!("system default track {} (version {})", track, version)
            }
            ResolutionSource::DefaultTrack => {
                format!("default track {} (version {})", track, version)
            }
            ResolutionSource::None => "unversioned".to_string(),
        }
    }
}

/// Resolve the effective version for a user.
pub fn resolve_effective_version(
    tracks: &BTreeMap<String, String>,
    default_track: &str,
    system: Option<&VersionPreference>,
    user: Option<&VersionPreference>,
) -> Resolution {
    let layers = [(Scope::User, user), (Scope::System, system)];

    for (scope, pref) in layers {
        let Some(pref) = pref else { continue };

        if let Some(version) = pref.version() {
            return Resolution {
                source: ResolutionSource::pinned(scope),
                value: Some(version.to_string()),
                track: None,
                warning: None,
            };
        }

        if let Some(track) = pref.track() {
            let warning = match tracks.get(track) {
                Some(_) => None,
                None => Some(TrackWarning {
                    scope,
                    track: track.to_string(),
                }),
            };
            return Resolution {
                source: ResolutionSource::track(scope),
                value: tracks.get(track).cloned(),
                track: Some(track.to_string()),
                warning,
            };
        }
    }

    match tracks.get(default_track) {
        Some(version) if !default_track.is_empty() => Resolution {
            source: ResolutionSource::DefaultTrack,
            value: Some(version.clone()),
            track: Some(default_track.to_string()),
            warning: None,
        },
        _ => Resolution::unresolved(),
    }
}

/// Version a user without a personal choice receives.
pub fn effective_default_version(
    tracks: &BTreeMap<String, String>,
    default_track: &str,
    system: Option<&VersionPreference>,
) -> Option<String> {
    resolve_effective_version(tracks, default_track, system, None).value
}

/// Every stale track reference, in either layer.
///
/// A user pin can hide a stale system track from resolution; admins still
/// need to see it.
pub fn track_warnings(data: &AppVersions) -> Vec<TrackWarning> {
    [(Scope::User, data.user.as_ref()), (Scope::System, data.system.as_ref())]
        .into_iter()
        .filter_map(|(scope, pref)| {
            let pref = pref.filter(|p| p.version().is_none())?;
            let track = pref.track()?;
            (!data.tracks.contains_key(track)).then(|| TrackWarning {
                scope,
                track: track.to_string(),
            })
        })
        .collect()
}

/// Resolution state of an app's versions query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionState {
    /// Query has not completed
    Loading,
    /// Single version, no tracks
    Unversioned,
    Resolved {
        resolution: Resolution,
        /// What users without an override receive
        default_version: Option<String>,
    },
}

/// Resolve from a possibly not-yet-loaded versions query.
pub fn resolve_app_versions(data: Option<&AppVersions>) -> VersionState {
    let Some(data) = data else {
        return VersionState::Loading;
    };
    if !data.is_versioned() {
        return VersionState::Unversioned;
    }

    VersionState::Resolved {
        resolution: resolve_effective_version(
            &data.tracks,
            &data.default_track,
            data.system.as_ref(),
            data.user.as_ref(),
        ),
        default_version: effective_default_version(
            &data.tracks,
            &data.default_track,
            data.system.as_ref(),
        ),
    }
}
