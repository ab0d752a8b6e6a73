//! Routing resolver - which installed app handles a class, service or path.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::{ResourceType, RoutingApp, RoutingData, RoutingResource};

// Published apps carry entity ids; development apps have short local ids.
static PUBLISHED_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[1-9A-HJ-NP-Za-km-z]{50,51}$").expect("published id pattern is valid")
});

/// Whether an app id looks like a published entity id.
///
/// This is inferred from id shape only. Swap it out if the backend starts
/// reporting provenance directly.
pub fn is_published_identifier(id: &str) -> bool {
    PUBLISHED_ID.is_match(id)
}

/// Name shown for a candidate app.
pub fn display_name(app: &RoutingApp) -> String {
    if is_published_identifier(&app.id) {
        app.name.clone()
    } else {
        format!("{} (development)", app.name)
    }
}

/// Which layer picked the handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerSource {
    User,
    System,
    FirstDeclared,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handler<'a> {
    pub app_id: Option<&'a str>,
    pub source: HandlerSource,
}

/// Resolve the handler: user, then system, then the first declarer.
pub fn resolve_handler(resource: &RoutingResource) -> Handler<'_> {
    if let Some(user) = resource.user.as_deref().filter(|s| !s.is_empty()) {
        return Handler {
            app_id: Some(user),
            source: HandlerSource::User,
        };
    }
    if let Some(system) = resource.system.as_deref().filter(|s| !s.is_empty()) {
        return Handler {
            app_id: Some(system),
            source: HandlerSource::System,
        };
    }
    match resource.apps.first() {
        Some(app) => Handler {
            app_id: Some(app.id.as_str()),
            source: HandlerSource::FirstDeclared,
        },
        None => Handler {
            app_id: None,
            source: HandlerSource::None,
        },
    }
}

pub fn effective_handler(resource: &RoutingResource) -> Option<&str> {
    resolve_handler(resource).app_id
}

/// More than one app declared the resource. Preferences do not clear this.
pub fn has_conflict(resource: &RoutingResource) -> bool {
    resource.apps.len() > 1
}

/// Candidates by name, published before development on equal names.
pub fn sort_candidates(apps: &[RoutingApp]) -> Vec<&RoutingApp> {
    let mut sorted: Vec<&RoutingApp> = apps.iter().collect();
    sorted.sort_by(|a, b| {
        a.name.cmp(&b.name).then_with(|| {
            match (is_published_identifier(&a.id), is_published_identifier(&b.id)) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => Ordering::Equal,
            }
        })
    });
    sorted
}

pub fn sorted_resource_names<V>(resources: &BTreeMap<String, V>) -> Vec<&str> {
    let mut names: Vec<&str> = resources.keys().map(|k| k.as_str()).collect();
    names.sort_unstable();
    names
}

/// Presentation summary of one routed resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingRow {
    pub kind: ResourceType,
    pub name: String,
    pub candidates: Vec<RoutingApp>,
    pub conflict: bool,
    pub handler: Option<String>,
    pub source: HandlerSource,
    pub system: Option<String>,
    pub user: Option<String>,
    handler_label: Option<String>,
}

impl RoutingRow {
    fn new(kind: ResourceType, name: &str, resource: &RoutingResource) -> Self {
        let handler = resolve_handler(resource);
        let handler_label = handler.app_id.map(|id| {
            resource
                .find_app(id)
                .map(display_name)
                .unwrap_or_else(|| id.to_string())
        });
        Self {
            kind,
            name: name.to_string(),
            candidates: sort_candidates(&resource.apps).into_iter().cloned().collect(),
            conflict: has_conflict(resource),
            handler: handler.app_id.map(str::to_string),
            source: handler.source,
            system: resource.system.clone().filter(|s| !s.is_empty()),
            user: resource.user.clone().filter(|s| !s.is_empty()),
            handler_label,
        }
    }

    pub fn display_resource(&self) -> String {
        self.kind.display_resource(&self.name)
    }

    /// Display name of the handler, falling back to its id when it is not
    /// among the declarers.
    pub fn handler_name(&self) -> Option<&str> {
        self.handler_label.as_deref()
    }

    pub fn declared_by(&self) -> String {
        self.candidates
            .iter()
            .map(display_name)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Rows for one resource type, or `None` while the routing query loads.
pub fn routing_table(data: Option<&RoutingData>, kind: ResourceType) -> Option<Vec<RoutingRow>> {
    let resources = data?.resources(kind);
    Some(
        sorted_resource_names(resources)
            .into_iter()
            .filter_map(|name| resources.get(name).map(|r| RoutingRow::new(kind, name, r)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn published_identifier_rejects_ambiguous_characters() {
        let valid = "1".repeat(50);
        assert!(is_published_identifier(&valid));
        assert!(!is_published_identifier(&"0".repeat(50)));
        assert!(!is_published_identifier(&"O".repeat(51)));
        assert!(!is_published_identifier(&"1".repeat(52)));
    }

    #[test]
    fn empty_preference_strings_are_ignored() {
        let resource = RoutingResource {
            apps: vec![RoutingApp {
                id: "a".into(),
                name: "A".into(),
            }],
            system: Some(String::new()),
            user: Some(String::new()),
        };
        let handler = resolve_handler(&resource);
        assert_eq!(handler.app_id, Some("a"));
        assert_eq!(handler.source, HandlerSource::FirstDeclared);
    }
}
