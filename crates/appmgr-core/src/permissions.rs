//! Permissions - classification, display and the consent request flow.

use crate::cache::Session;
use crate::client::AppsApi;
use crate::error::Result;

/// Permissions that cannot be granted through one-click consent.
pub const RESTRICTED_PERMISSIONS: &[&str] = &[
    "url:*",
    "access/allow",
    "access/deny",
    "access/revoke",
    "user/read",
    "entity/delete",
    "setting/write",
    "permission/manage",
    "webpush/send",
];

// (permission, action, what it allows)
const CAPABILITIES: &[(&str, &str, &str)] = &[
    ("group/manage", "manage groups", "create, delete, and modify groups and their members"),
    ("access/allow", "grant access", "grant others access to your content"),
    ("access/deny", "deny access", "deny others access to your content"),
    ("access/revoke", "revoke access", "revoke access that was previously granted"),
    ("user/read", "read user information", "read information about other users on this server"),
    ("entity/delete", "delete data", "permanently delete your data"),
    ("setting/write", "modify settings", "change system settings"),
    ("permission/manage", "manage permissions", "grant and revoke permissions for apps"),
    ("webpush/send", "send notifications", "send push notifications to your devices"),
];

pub fn is_restricted_permission(permission: &str) -> bool {
    RESTRICTED_PERMISSIONS.contains(&permission)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionKind {
    Url,
    Service,
    Capability,
}

/// How a permission is described to the person approving it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDisplay {
    pub kind: PermissionKind,
    /// Domain, service name, or action verb
    pub primary: String,
    pub secondary: String,
}

pub fn describe_permission(permission: &str) -> PermissionDisplay {
    if let Some((_, action, description)) = CAPABILITIES.iter().find(|(p, _, _)| *p == permission) {
        return PermissionDisplay {
            kind: PermissionKind::Capability,
            primary: action.to_string(),
            secondary: format!("to {}", description),
        };
    }

    if let Some(domain) = permission.strip_prefix("url:") {
        return if domain == "*" {
            PermissionDisplay {
                kind: PermissionKind::Url,
                primary: "any website".to_string(),
                secondary: "make network requests to any domain".to_string(),
            }
        } else {
            PermissionDisplay {
                kind: PermissionKind::Url,
                primary: domain.to_string(),
                secondary: "and its subdomains".to_string(),
            }
        };
    }

    if let Some(service) = permission.strip_prefix("service:") {
        let mut chars = service.chars();
        let name = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        return PermissionDisplay {
            kind: PermissionKind::Service,
            primary: format!("{} service", name),
            secondary: String::new(),
        };
    }

    PermissionDisplay {
        kind: PermissionKind::Capability,
        primary: permission.to_string(),
        secondary: format!("to use the {} capability", permission),
    }
}

/// Short label for permission lists.
pub fn permission_label(permission: &str) -> String {
    if let Some(domain) = permission.strip_prefix("url:") {
        return format!("Access {}", domain);
    }
    match CAPABILITIES.iter().find(|(p, _, _)| *p == permission) {
        Some((_, action, _)) => {
            let mut chars = action.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        }
        None => permission.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Result delivered to the opener of a popup consent window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Granted,
    Denied,
}

impl Completion {
    /// Terminal message when the opener cannot be confirmed to have closed us.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::Granted => "Permission granted. Please close this tab and return to the app.",
            Self::Denied => "Permission denied. Please close this tab and return to the app.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// App or permission missing from the request
    Invalid,
    /// Restricted; the app's permission settings must be used instead
    RequiresSettings { app: String },
    /// Popup flow finished; signal the opener
    Completed(Completion),
    /// Return the user to where they came from
    Redirect(String),
}

/// An app asking the user for a permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionRequest {
    pub app: String,
    pub permission: String,
    pub return_url: String,
    /// Opened by another window
    pub popup: bool,
}

impl PermissionRequest {
    pub fn new(app: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            permission: permission.into(),
            return_url: "/".to_string(),
            popup: false,
        }
    }

    pub fn with_return_url(mut self, url: impl Into<String>) -> Self {
        self.return_url = url.into();
        self
    }

    pub fn in_popup(mut self) -> Self {
        self.popup = true;
        self
    }

    pub fn is_restricted(&self) -> bool {
        is_restricted_permission(&self.permission)
    }

    fn finish(&self, completion: Completion) -> RequestOutcome {
        if self.popup {
            RequestOutcome::Completed(completion)
        } else {
            RequestOutcome::Redirect(self.return_url.clone())
        }
    }

    /// Apply the user's decision. Only an allowed, unrestricted request
    /// reaches the backend.
    pub async fn respond<A: AppsApi>(
        &self,
        session: &Session<A>,
        decision: Decision,
    ) -> Result<RequestOutcome> {
        if self.app.is_empty() || self.permission.is_empty() {
            return Ok(RequestOutcome::Invalid);
        }

        match decision {
            Decision::Deny => Ok(self.finish(Completion::Denied)),
            Decision::Allow if self.is_restricted() => {
                tracing::info!(
                    app_id = %self.app,
                    permission = %self.permission,
                    "Restricted permission requires settings"
                );
                Ok(RequestOutcome::RequiresSettings { app: self.app.clone() })
            }
            Decision::Allow => {
                session.grant_permission(&self.app, &self.permission).await?;
                Ok(self.finish(Completion::Granted))
            }
        }
    }
}
