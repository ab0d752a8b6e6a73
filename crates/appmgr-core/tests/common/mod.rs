#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use appmgr_core::error::{ApiError, Result};
use appmgr_core::model::{
    AppInformation, AppPermissions, AppVersions, InstallOutcome, InstalledApp, InstalledApps,
    MarketApp, MultiVersionAvailable, PendingUpdate, PendingUpdates, ResourceType, RoutingData,
    VersionPreference,
};
use appmgr_core::{AppsApi, Scope};
use async_trait::async_trait;
use tokio::sync::Notify;

/// Holds one `list_installed` open: signals `started`, then waits for `release`.
#[derive(Default, Clone)]
pub struct Gate {
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

/// In-memory backend that records every call.
#[derive(Default)]
pub struct FakeApi {
    pub installed: InstalledApps,
    pub versions: HashMap<String, AppVersions>,
    pub permissions: HashMap<String, AppPermissions>,
    pub routing: RoutingData,
    pub updates: PendingUpdates,
    /// Upgrades of these app ids fail
    pub failing_upgrades: HashSet<String>,
    /// Every mutation fails
    pub reject_mutations: bool,
    /// Consumed by the first `list_installed`
    pub installed_gate: Mutex<Option<Gate>>,
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls whose name starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn mutation(&self, call: String) -> Result<()> {
        self.record(call);
        if self.reject_mutations {
            return Err(ApiError::Http {
                status: 500,
                message: "backend unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AppsApi for FakeApi {
    async fn list_installed(&self) -> Result<InstalledApps> {
        self.record("list_installed".into());
        let snapshot = self.installed.clone();
        let gate = self.installed_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.started.notify_one();
            gate.release.notified().await;
        }
        Ok(snapshot)
    }

    async fn market(&self) -> Result<Vec<MarketApp>> {
        self.record("market".into());
        Ok(Vec::new())
    }

    async fn app_information(&self, id: &str) -> Result<AppInformation> {
        self.record(format!("app_information:{}", id));
        Ok(AppInformation::default())
    }

    async fn install(
        &self,
        id: &str,
        version: &str,
        _peer: Option<&str>,
    ) -> Result<InstallOutcome> {
        self.mutation(format!("install:{}:{}", id, version))?;
        Ok(InstallOutcome {
            installed: true,
            id: id.to_string(),
            version: version.to_string(),
        })
    }

    async fn upgrade(&self, id: &str, version: &str) -> Result<()> {
        self.mutation(format!("upgrade:{}:{}", id, version))?;
        if self.failing_upgrades.contains(id) {
            return Err(ApiError::Application {
                status: 409,
                message: format!("{} is locked", id),
            });
        }
        Ok(())
    }

    async fn cleanup(&self) -> Result<()> {
        self.mutation("cleanup".into())
    }

    async fn updates(&self) -> Result<PendingUpdates> {
        self.record("updates".into());
        Ok(self.updates.clone())
    }

    async fn multiversion_available(&self) -> Result<MultiVersionAvailable> {
        self.record("multiversion_available".into());
        Ok(MultiVersionAvailable { available: true, version: "1".into() })
    }

    async fn app_versions(&self, id: &str) -> Result<AppVersions> {
        self.record(format!("app_versions:{}", id));
        self.versions.get(id).cloned().ok_or_else(|| ApiError::Http {
            status: 404,
            message: format!("no app {}", id),
        })
    }

    async fn set_version(
        &self,
        id: &str,
        scope: Scope,
        preference: &VersionPreference,
    ) -> Result<()> {
        self.mutation(format!(
            "set_version:{}:{}:version={}:track={}",
            id, scope, preference.version, preference.track
        ))
    }

    async fn routing(&self) -> Result<RoutingData> {
        self.record("routing".into());
        Ok(self.routing.clone())
    }

    async fn set_routing(
        &self,
        kind: ResourceType,
        name: &str,
        app_id: &str,
        scope: Scope,
    ) -> Result<()> {
        self.mutation(format!("set_routing:{}:{}:{}:{}", kind, name, app_id, scope))
    }

    async fn app_permissions(&self, id: &str) -> Result<AppPermissions> {
        self.record(format!("app_permissions:{}", id));
        Ok(self.permissions.get(id).cloned().unwrap_or_default())
    }

    async fn grant_permission(&self, id: &str, permission: &str) -> Result<()> {
        self.mutation(format!("grant_permission:{}:{}", id, permission))
    }

    async fn revoke_permission(&self, id: &str, permission: &str) -> Result<()> {
        self.mutation(format!("revoke_permission:{}:{}", id, permission))
    }

    async fn set_permission(&self, id: &str, permission: &str, enabled: bool) -> Result<()> {
        self.mutation(format!("set_permission:{}:{}:{}", id, permission, enabled))
    }
}

/// A 50-character id in the published-id alphabet.
pub fn published_id(c: char) -> String {
    std::iter::repeat(c).take(50).collect()
}

pub fn app(id: &str, name: &str) -> InstalledApp {
    InstalledApp {
        id: id.to_string(),
        name: name.to_string(),
        latest: "1.0".to_string(),
        ..Default::default()
    }
}

pub fn update(id: &str, current: &str, available: &str) -> PendingUpdate {
    PendingUpdate {
        id: id.to_string(),
        name: id.to_uppercase(),
        current: current.to_string(),
        available: available.to_string(),
        publisher: "market".to_string(),
    }
}

pub fn tracks(pairs: &[(&str, &str)]) -> std::collections::BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(t, v)| (t.to_string(), v.to_string()))
        .collect()
}
