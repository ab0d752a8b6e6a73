//! Read-through query cache keyed by query identity.
//!
//! Reads are served from cache when present and fetched otherwise. Every
//! write goes through [`Session`], and a successful write drops exactly the
//! entries its [`Mutation`] invalidates. A failed write drops nothing.
//!
//! A fetch that was in flight while any invalidation happened is returned
//! to its caller but never stored, since it may predate the write.

use std::collections::HashMap;
use std::future::Future;

use tokio::sync::Mutex;

use crate::client::AppsApi;
use crate::error::Result;
use crate::model::{
    AppInformation, AppPermissions, AppVersions, InstallOutcome, InstalledApp, InstalledApps,
    MarketApp, MultiVersionAvailable, PendingUpdates, ResourceType, RoutingData,
};
use crate::preference::{Scope, Selection};
use crate::resolve::{resolve_app_versions, VersionState};

/// Identity of a cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Installed,
    Market,
    Updates,
    AppInfo(String),
    AppVersions(String),
    AppPermissions(String),
    Routing,
    MultiVersionAvailable,
}

impl QueryKey {
    /// Keys under the `apps` prefix, dropped wholesale by installs and upgrades.
    pub fn is_apps_family(&self) -> bool {
        matches!(
            self,
            Self::Installed | Self::Market | Self::Updates | Self::AppInfo(_)
        )
    }
}

/// A write against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    SetVersion { app: String, scope: Scope },
    SetRouting { kind: ResourceType, scope: Scope },
    GrantPermission { app: String },
    RevokePermission { app: String },
    SetPermission { app: String },
    Install { app: String },
    Upgrade { app: String },
    Cleanup,
}

impl Mutation {
    /// Whether `key` is stale once this mutation succeeds.
    pub fn invalidates(&self, key: &QueryKey) -> bool {
        match self {
            // The running version shown in the app list follows resolution.
            Self::SetVersion { app, .. } => match key {
                QueryKey::AppVersions(id) => id == app,
                QueryKey::Installed => true,
                _ => false,
            },
            Self::SetRouting { .. } => matches!(key, QueryKey::Routing),
            Self::GrantPermission { app }
            | Self::RevokePermission { app }
            | Self::SetPermission { app } => {
                matches!(key, QueryKey::AppPermissions(id) if id == app)
            }
            Self::Install { .. } | Self::Upgrade { .. } => key.is_apps_family(),
            Self::Cleanup => false,
        }
    }
}

/// State of a read as seen by presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loadable<T> {
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<Result<T>> for Loadable<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Ready(value),
            Err(e) => Self::Failed(e.to_string()),
        }
    }
}

/// The three independent reads behind an app's detail page.
#[derive(Debug, Clone)]
pub struct AppDetail {
    pub app_id: String,
    pub installed: Loadable<InstalledApps>,
    pub versions: Loadable<AppVersions>,
    pub permissions: Loadable<AppPermissions>,
}

impl AppDetail {
    pub fn app(&self) -> Option<&InstalledApp> {
        self.installed.ready()?.find(&self.app_id)
    }

    /// A failed versions read shows as unversioned.
    pub fn version_state(&self) -> VersionState {
        match &self.versions {
            Loadable::Failed(_) => VersionState::Unversioned,
            other => resolve_app_versions(other.ready()),
        }
    }
}

#[derive(Debug, Clone)]
enum Entry {
    Installed(InstalledApps),
    Market(Vec<MarketApp>),
    Updates(PendingUpdates),
    AppInfo(AppInformation),
    AppVersions(AppVersions),
    AppPermissions(AppPermissions),
    Routing(RoutingData),
    MultiVersion(MultiVersionAvailable),
}

trait Cached: Clone {
    fn into_entry(self) -> Entry;
    fn from_entry(entry: &Entry) -> Option<Self>;
}

macro_rules! cached {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Cached for $ty {
                fn into_entry(self) -> Entry {
                    Entry::$variant(self)
                }

                fn from_entry(entry: &Entry) -> Option<Self> {
                    match entry {
                        Entry::$variant(value) => Some(value.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

cached! {
    InstalledApps => Installed,
    Vec<MarketApp> => Market,
    PendingUpdates => Updates,
    AppInformation => AppInfo,
    AppVersions => AppVersions,
    AppPermissions => AppPermissions,
    RoutingData => Routing,
    MultiVersionAvailable => MultiVersion,
}

#[derive(Default)]
struct Store {
    entries: HashMap<QueryKey, Entry>,
    /// Bumped by every invalidation
    epoch: u64,
}

/// Cached view of the backend for one operator session.
pub struct Session<A> {
    api: A,
    store: Mutex<Store>,
}

impl<A: AppsApi> Session<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            store: Mutex::new(Store::default()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub async fn is_cached(&self, key: &QueryKey) -> bool {
        self.store.lock().await.entries.contains_key(key)
    }

    async fn read<T, F>(&self, key: QueryKey, fetch: F) -> Result<T>
    where
        T: Cached,
        F: Future<Output = Result<T>>,
    {
        let epoch = {
            let store = self.store.lock().await;
            if let Some(hit) = store.entries.get(&key).and_then(T::from_entry) {
                tracing::trace!(?key, "Cache hit");
                return Ok(hit);
            }
            store.epoch
        };

        let value = fetch.await?;

        let mut store = self.store.lock().await;
        if store.epoch == epoch {
            store.entries.insert(key, value.clone().into_entry());
        } else {
            tracing::debug!(?key, "Invalidated during fetch, not caching");
        }
        Ok(value)
    }

    async fn mutate<R, F>(&self, mutation: Mutation, op: F) -> Result<R>
    where
        F: Future<Output = Result<R>>,
    {
        match op.await {
            Ok(out) => {
                self.invalidate(&mutation).await;
                Ok(out)
            }
            Err(e) => {
                tracing::warn!(?mutation, error = %e, "Mutation failed");
                Err(e)
            }
        }
    }

    /// Drop every entry the mutation makes stale.
    pub async fn invalidate(&self, mutation: &Mutation) {
        let mut store = self.store.lock().await;
        store.epoch += 1;
        let before = store.entries.len();
        store.entries.retain(|key, _| !mutation.invalidates(key));
        tracing::debug!(
            ?mutation,
            dropped = before - store.entries.len(),
            "Invalidated cached queries"
        );
    }

    pub async fn installed(&self) -> Result<InstalledApps> {
        self.read(QueryKey::Installed, self.api.list_installed()).await
    }

    pub async fn market(&self) -> Result<Vec<MarketApp>> {
        self.read(QueryKey::Market, self.api.market()).await
    }

    pub async fn updates(&self) -> Result<PendingUpdates> {
        self.read(QueryKey::Updates, self.api.updates()).await
    }

    pub async fn app_information(&self, id: &str) -> Result<AppInformation> {
        self.read(QueryKey::AppInfo(id.to_string()), self.api.app_information(id))
            .await
    }

    pub async fn app_versions(&self, id: &str) -> Result<AppVersions> {
        self.read(QueryKey::AppVersions(id.to_string()), self.api.app_versions(id))
            .await
    }

    pub async fn app_permissions(&self, id: &str) -> Result<AppPermissions> {
        self.read(QueryKey::AppPermissions(id.to_string()), self.api.app_permissions(id))
            .await
    }

    pub async fn routing(&self) -> Result<RoutingData> {
        self.read(QueryKey::Routing, self.api.routing()).await
    }

    pub async fn multiversion_available(&self) -> Result<MultiVersionAvailable> {
        self.read(QueryKey::MultiVersionAvailable, self.api.multiversion_available())
            .await
    }

    /// Issue the detail reads concurrently; each settles independently.
    pub async fn load_app_detail(&self, id: &str) -> AppDetail {
        let (installed, versions, permissions) = futures::join!(
            self.installed(),
            self.app_versions(id),
            self.app_permissions(id)
        );
        AppDetail {
            app_id: id.to_string(),
            installed: installed.into(),
            versions: versions.into(),
            permissions: permissions.into(),
        }
    }

    pub async fn set_version(&self, id: &str, scope: Scope, selection: &Selection) -> Result<()> {
        let preference = selection.to_preference();
        self.mutate(
            Mutation::SetVersion {
                app: id.to_string(),
                scope,
            },
            self.api.set_version(id, scope, &preference),
        )
        .await
    }

    pub async fn set_routing(
        &self,
        kind: ResourceType,
        name: &str,
        app_id: &str,
        scope: Scope,
    ) -> Result<()> {
        self.mutate(
            Mutation::SetRouting { kind, scope },
            self.api.set_routing(kind, name, app_id, scope),
        )
        .await
    }

    pub async fn grant_permission(&self, id: &str, permission: &str) -> Result<()> {
        self.mutate(
            Mutation::GrantPermission { app: id.to_string() },
            self.api.grant_permission(id, permission),
        )
        .await
    }

    pub async fn revoke_permission(&self, id: &str, permission: &str) -> Result<()> {
        self.mutate(
            Mutation::RevokePermission { app: id.to_string() },
            self.api.revoke_permission(id, permission),
        )
        .await
    }

    pub async fn set_permission(&self, id: &str, permission: &str, enabled: bool) -> Result<()> {
        self.mutate(
            Mutation::SetPermission { app: id.to_string() },
            self.api.set_permission(id, permission, enabled),
        )
        .await
    }

    pub async fn install(
        &self,
        id: &str,
        version: &str,
        peer: Option<&str>,
    ) -> Result<InstallOutcome> {
        self.mutate(
            Mutation::Install { app: id.to_string() },
            self.api.install(id, version, peer),
        )
        .await
    }

    pub async fn upgrade(&self, id: &str, version: &str) -> Result<()> {
        self.mutate(
            Mutation::Upgrade { app: id.to_string() },
            self.api.upgrade(id, version),
        )
        .await
    }

    pub async fn cleanup(&self) -> Result<()> {
        self.mutate(Mutation::Cleanup, self.api.cleanup()).await
    }
}
