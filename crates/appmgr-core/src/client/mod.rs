//! Client - the backend operations the resolvers consume.

pub mod endpoints;
mod http;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{
    AppInformation, AppPermissions, AppVersions, InstallOutcome, InstalledApps, MarketApp,
    MultiVersionAvailable, PendingUpdates, ResourceType, RoutingData, VersionPreference,
};
use crate::preference::Scope;

pub use http::{bearer, parse_body, HttpClient};

/// Operations offered by the App Manager backend.
#[async_trait]
pub trait AppsApi: Send + Sync {
    async fn list_installed(&self) -> Result<InstalledApps>;

    async fn market(&self) -> Result<Vec<MarketApp>>;

    /// Publisher information and published tracks
    async fn app_information(&self, id: &str) -> Result<AppInformation>;

    async fn install(&self, id: &str, version: &str, peer: Option<&str>) -> Result<InstallOutcome>;

    async fn upgrade(&self, id: &str, version: &str) -> Result<()>;

    /// Remove versions no longer referenced by any preference
    async fn cleanup(&self) -> Result<()>;

    async fn updates(&self) -> Result<PendingUpdates>;

    async fn multiversion_available(&self) -> Result<MultiVersionAvailable>;

    async fn app_versions(&self, id: &str) -> Result<AppVersions>;

    /// Both fields are always sent; the cleared one as an empty string.
    async fn set_version(
        &self,
        id: &str,
        scope: Scope,
        preference: &VersionPreference,
    ) -> Result<()>;

    async fn routing(&self) -> Result<RoutingData>;

    /// An empty `app_id` clears the preference.
    async fn set_routing(
        &self,
        kind: ResourceType,
        name: &str,
        app_id: &str,
        scope: Scope,
    ) -> Result<()>;

    async fn app_permissions(&self, id: &str) -> Result<AppPermissions>;

    async fn grant_permission(&self, id: &str, permission: &str) -> Result<()>;

    async fn revoke_permission(&self, id: &str, permission: &str) -> Result<()>;

    async fn set_permission(&self, id: &str, permission: &str, enabled: bool) -> Result<()>;
}

/// Source of the session token. The core never stores it.
pub trait CredentialProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// A fixed token.
#[derive(Debug, Clone)]
pub struct StaticToken(pub String);

impl CredentialProvider for StaticToken {
    fn token(&self) -> Option<String> {
        (!self.0.is_empty()).then(|| self.0.clone())
    }
}

/// Token read from an environment variable on every request.
#[derive(Debug, Clone)]
pub struct EnvToken(pub String);

impl CredentialProvider for EnvToken {
    fn token(&self) -> Option<String> {
        std::env::var(&self.0).ok().filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoCredentials;

impl CredentialProvider for NoCredentials {
    fn token(&self) -> Option<String> {
        None
    }
}
