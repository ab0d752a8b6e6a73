//! Routing table: which app handles a class, service or path.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kind of routed resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Class,
    Service,
    Path,
}

impl ResourceType {
    pub const ALL: [ResourceType; 3] = [Self::Class, Self::Service, Self::Path];

    /// Wire name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Service => "service",
            Self::Path => "path",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            Self::Class => "classes",
            Self::Service => "services",
            Self::Path => "paths",
        }
    }

    /// Paths are shown with a leading slash.
    pub fn display_resource(&self, name: &str) -> String {
        match self {
            Self::Path => format!("/{}", name),
            _ => name.to_string(),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "class" | "classes" => Ok(Self::Class),
            "service" | "services" => Ok(Self::Service),
            "path" | "paths" => Ok(Self::Path),
            other => Err(format!("unknown resource type: {}", other)),
        }
    }
}

/// An app that declared a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingApp {
    pub id: String,
    pub name: String,
}

/// A routed resource with its declarers and preference layers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingResource {
    /// Declaring apps, in backend order
    #[serde(default)]
    pub apps: Vec<RoutingApp>,

    /// Admin default app id
    #[serde(default)]
    pub system: Option<String>,

    /// Personal override app id
    #[serde(default)]
    pub user: Option<String>,
}

impl RoutingResource {
    pub fn find_app(&self, id: &str) -> Option<&RoutingApp> {
        self.apps.iter().find(|a| a.id == id)
    }
}

/// Response of the routing query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingData {
    #[serde(default)]
    pub classes: BTreeMap<String, RoutingResource>,
    #[serde(default)]
    pub services: BTreeMap<String, RoutingResource>,
    #[serde(default)]
    pub paths: BTreeMap<String, RoutingResource>,
    #[serde(default)]
    pub is_admin: bool,
}

impl RoutingData {
    pub fn resources(&self, kind: ResourceType) -> &BTreeMap<String, RoutingResource> {
        match kind {
            ResourceType::Class => &self.classes,
            ResourceType::Service => &self.services,
            ResourceType::Path => &self.paths,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.services.is_empty() && self.paths.is_empty()
    }
}
