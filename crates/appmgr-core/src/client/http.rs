//! HTTP implementation of [`AppsApi`] over reqwest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::endpoints;
use super::{AppsApi, CredentialProvider};
use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::model::{
    AppInformation, AppPermissions, AppVersions, ErrorBody, InstallOutcome, InstalledApps,
    MarketApp, MultiVersionAvailable, PendingUpdates, ResourceType, RoutingData,
    VersionPreference,
};
use crate::preference::Scope;

#[derive(Debug, Deserialize)]
struct MarketResponse {
    #[serde(default)]
    apps: Vec<MarketApp>,
}

/// Authorization header value for a token.
pub fn bearer(token: &str) -> String {
    if token.starts_with("Bearer ") {
        token.to_string()
    } else {
        format!("Bearer {}", token)
    }
}

/// Decode a response body.
///
/// Non-2xx statuses become [`ApiError::Http`]. A 2xx body of the form
/// `{error, status >= 400}` becomes [`ApiError::Application`]. The payload
/// is taken from the `data` envelope when present, otherwise the body itself.
pub fn parse_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T> {
    let text = if body.trim().is_empty() { "null" } else { body };

    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<ErrorBody>(text)
            .ok()
            .and_then(|e| e.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("request failed with status {}", status));
        return Err(ApiError::Http { status, message });
    }

    let value: Value = serde_json::from_str(text)?;

    if let Ok(err) = serde_json::from_value::<ErrorBody>(value.clone()) {
        if let Some((status, message)) = err.failure() {
            return Err(ApiError::Application {
                status,
                message: message.to_string(),
            });
        }
    }

    let payload = match value {
        Value::Object(mut map) => match map.remove("data") {
            Some(data) => data,
            None => Value::Object(map),
        },
        other => other,
    };

    Ok(serde_json::from_value(payload)?)
}

/// Backend client over HTTP.
pub struct HttpClient {
    http: reqwest::Client,
    base: Url,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        Self::with_credentials(
            &config.base_url,
            Duration::from_secs(config.timeout_secs),
            config.credentials(),
        )
    }

    pub fn with_credentials(
        base_url: &str,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        let mut normalized = base_url.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base = Url::parse(&normalized)
            .map_err(|e| ApiError::Config(format!("invalid base URL {}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;

        Ok(Self {
            http,
            base,
            credentials,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let url = self
            .base
            .join(path)
            .map_err(|e| ApiError::Config(format!("invalid endpoint {}: {}", path, e)))?;

        let mut request = self.http.request(method, url);
        if let Some(token) = self.credentials.token() {
            request = request.header(reqwest::header::AUTHORIZATION, bearer(&token));
        }
        Ok(request)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        tracing::debug!(path, "GET");
        let request = self.request(Method::GET, path)?.query(query);
        self.send(path, request).await
    }

    async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        tracing::debug!(path, "POST");
        let request = self.request(Method::POST, path)?.json(body);
        let _: Value = self.send(path, request).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, request: RequestBuilder) -> Result<T> {
        let result: Result<T> = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let body = response.text().await?;
            parse_body(status, &body)
        }
        .await;

        if let Err(e) = &result {
            tracing::warn!(path, error = %e, "Request failed");
        }
        result
    }
}

#[async_trait]
impl AppsApi for HttpClient {
    async fn list_installed(&self) -> Result<InstalledApps> {
        self.get(endpoints::APPS_LIST, &[]).await
    }

    async fn market(&self) -> Result<Vec<MarketApp>> {
        let response: MarketResponse = self.get(endpoints::APPS_MARKET, &[]).await?;
        Ok(response.apps)
    }

    async fn app_information(&self, id: &str) -> Result<AppInformation> {
        self.get(endpoints::APPS_INFORMATION, &[("id", id)]).await
    }

    async fn install(&self, id: &str, version: &str, peer: Option<&str>) -> Result<InstallOutcome> {
        let mut query = vec![("id", id), ("version", version)];
        if let Some(peer) = peer {
            query.push(("peer", peer));
        }
        tracing::info!(app_id = %id, version = %version, "Installing app");
        self.get(endpoints::APPS_INSTALL, &query).await
    }

    async fn upgrade(&self, id: &str, version: &str) -> Result<()> {
        tracing::info!(app_id = %id, version = %version, "Upgrading app");
        self.post(endpoints::APPS_UPGRADE, &json!({ "id": id, "version": version }))
            .await
    }

    async fn cleanup(&self) -> Result<()> {
        self.post(endpoints::APPS_CLEANUP, &json!({})).await
    }

    async fn updates(&self) -> Result<PendingUpdates> {
        self.get(endpoints::APPS_UPDATES, &[]).await
    }

    async fn multiversion_available(&self) -> Result<MultiVersionAvailable> {
        self.get(endpoints::VERSIONS_AVAILABLE, &[]).await
    }

    async fn app_versions(&self, id: &str) -> Result<AppVersions> {
        self.get(endpoints::VERSIONS, &[("app", id)]).await
    }

    async fn set_version(
        &self,
        id: &str,
        scope: Scope,
        preference: &VersionPreference,
    ) -> Result<()> {
        tracing::info!(
            app_id = %id,
            scope = %scope,
            version = %preference.version,
            track = %preference.track,
            "Setting version preference"
        );
        let body = json!({
            "app": id,
            "version": preference.version,
            "track": preference.track,
        });
        self.post(endpoints::version_set(scope), &body).await
    }

    async fn routing(&self) -> Result<RoutingData> {
        self.get(endpoints::ROUTING, &[]).await
    }

    async fn set_routing(
        &self,
        kind: ResourceType,
        name: &str,
        app_id: &str,
        scope: Scope,
    ) -> Result<()> {
        tracing::info!(
            kind = %kind,
            resource = %name,
            app_id = %app_id,
            scope = %scope,
            "Setting routing preference"
        );
        let body = json!({ "type": kind.name(), "name": name, "app": app_id });
        self.post(endpoints::routing_set(scope), &body).await
    }

    async fn app_permissions(&self, id: &str) -> Result<AppPermissions> {
        self.get(endpoints::PERMISSIONS_LIST, &[("app", id)]).await
    }

    async fn grant_permission(&self, id: &str, permission: &str) -> Result<()> {
        let body = json!({ "app": id, "permission": permission });
        self.post(endpoints::PERMISSIONS_GRANT, &body).await
    }

    async fn revoke_permission(&self, id: &str, permission: &str) -> Result<()> {
        let body = json!({ "app": id, "permission": permission });
        self.post(endpoints::PERMISSIONS_REVOKE, &body).await
    }

    async fn set_permission(&self, id: &str, permission: &str, enabled: bool) -> Result<()> {
        let body = json!({
            "app": id,
            "permission": permission,
            "enabled": enabled.to_string(),
        });
        self.post(endpoints::PERMISSIONS_SET, &body).await
    }
}
