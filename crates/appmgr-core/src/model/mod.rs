//! Backend payloads - immutable snapshots received from the App Manager API.

mod app;
mod permission;
mod routing;
mod update;
mod version;

use serde::{Deserialize, Serialize};

pub use app::{
    AppInfo, AppInformation, InstallOutcome, InstalledApp, InstalledApps, MarketApp, Track,
};
pub use permission::{AppPermissions, Permission};
pub use routing::{ResourceType, RoutingApp, RoutingData, RoutingResource};
pub use update::{PendingUpdate, PendingUpdates};
pub use version::{AppVersions, MultiVersionAvailable, VersionPreference};

/// Every successful response is wrapped in `{ "data": ... }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Body returned with HTTP 200 when the backend rejects a request.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: Option<String>,
    pub status: Option<u16>,
}

impl ErrorBody {
    /// Only an error message with a 4xx/5xx status counts as a failure.
    pub fn failure(&self) -> Option<(u16, &str)> {
        match (&self.error, self.status) {
            (Some(error), Some(status)) if !error.is_empty() && status >= 400 => {
                Some((status, error.as_str()))
            }
            _ => None,
        }
    }
}
