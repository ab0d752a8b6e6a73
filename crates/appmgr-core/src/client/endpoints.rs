//! Endpoint paths, relative to the configured base URL.

use crate::preference::Scope;

pub const APPS_LIST: &str = "apps/list";
pub const APPS_MARKET: &str = "apps/market";
pub const APPS_INFORMATION: &str = "apps/information";
pub const APPS_INSTALL: &str = "apps/install";
pub const APPS_UPGRADE: &str = "apps/upgrade";
pub const APPS_CLEANUP: &str = "apps/cleanup";
pub const APPS_UPDATES: &str = "apps/updates";

pub const VERSIONS_AVAILABLE: &str = "apps/versions/available";
pub const VERSIONS: &str = "apps/versions";

pub const ROUTING: &str = "apps/routing";

pub const PERMISSIONS_LIST: &str = "apps/permissions";
pub const PERMISSIONS_GRANT: &str = "apps/permissions/grant";
pub const PERMISSIONS_REVOKE: &str = "apps/permissions/revoke";
pub const PERMISSIONS_SET: &str = "apps/permissions/set";

/// Version preference setter for a scope.
pub fn version_set(scope: Scope) -> &'static str {
    match scope {
        Scope::User => "apps/versions/set",
        Scope::System => "apps/versions/system/set",
    }
}

/// Routing preference setter for a scope. The resource type travels in the body.
pub fn routing_set(scope: Scope) -> &'static str {
    match scope {
        Scope::User => "apps/routing/set",
        Scope::System => "apps/routing/system/set",
    }
}

