//! v2 REST implementation of [`CatalogClient`]

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use super::client::{CatalogClient, CatalogError, CatalogResult};
use super::model::{
    App, CatalogEntity, Org, ServiceBinding, ServiceClass, ServiceInstance, ServiceKey,
    ServicePlan, Space,
};
use super::query::Query;

const DEFAULT_USER_AGENT: &str = concat!("mysql-tools-core/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// One page of a list response
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct Page<T> {
    #[serde(default)]
    next_url: Option<String>,
    #[serde(default)]
    resources: Vec<Resource<T>>,
}

#[derive(Debug, Deserialize)]
struct Resource<T> {
    metadata: Metadata,
    entity: T,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    guid: String,
}

impl<T: CatalogEntity> Resource<T> {
    fn into_entity(self) -> T {
        self.entity.with_guid(self.metadata.guid)
    }
}

/// Catalog client speaking the v2 REST API
///
/// Follows `next_url` links so every list call returns the full result set.
#[derive(Debug, Clone)]
pub struct HttpCatalogClient {
    http: reqwest::Client,
    base_url: Url,
    access_token: Option<String>,
}

/// Builder for [`HttpCatalogClient`]
#[derive(Debug, Default)]
pub struct HttpCatalogClientBuilder {
    base_url: Option<String>,
    access_token: Option<String>,
    user_agent: Option<String>,
    skip_ssl_validation: bool,
    timeout: Option<Duration>,
}

impl HttpCatalogClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// OAuth token; a leading `bearer ` (as printed by `cf oauth-token`) is accepted
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub fn skip_ssl_validation(mut self, skip: bool) -> Self {
        self.skip_ssl_validation = skip;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> CatalogResult<HttpCatalogClient> {
        let raw = self
            .base_url
            .ok_or_else(|| CatalogError::InvalidUrl("no API URL configured".to_string()))?;
        let mut base_url =
            Url::parse(&raw).map_err(|e| CatalogError::InvalidUrl(format!("{raw}: {e}")))?;
        // Endpoints are joined as relative paths, so a path prefix must end in `/`
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .user_agent(self.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .danger_accept_invalid_certs(self.skip_ssl_validation)
            .build()
            .map_err(|e| CatalogError::Connection(e.to_string()))?;

        let access_token = self
            .access_token
            .map(|t| strip_bearer(&t).to_string())
            .filter(|t| !t.is_empty());

        Ok(HttpCatalogClient {
            http,
            base_url,
            access_token,
        })
    }
}

fn strip_bearer(token: &str) -> &str {
    let trimmed = token.trim();
    trimmed
        .strip_prefix("bearer ")
        .or_else(|| trimmed.strip_prefix("Bearer "))
        .unwrap_or(trimmed)
        .trim()
}

impl HttpCatalogClient {
    pub fn builder() -> HttpCatalogClientBuilder {
        HttpCatalogClientBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolves an API path (including a `next_url`) below the base URL
    fn endpoint(&self, path: &str) -> CatalogResult<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| CatalogError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn list<T: CatalogEntity>(
        &self,
        path: &str,
        resource: &'static str,
        query: &Query,
    ) -> CatalogResult<Vec<T>> {
        let mut url = self.endpoint(path)?;
        url.query_pairs_mut().append_pair("q", &query.to_string());

        let mut entities = Vec::new();
        let mut next = Some(url);
        let mut pages = 0usize;
        while let Some(page_url) = next.take() {
            let page: Page<T> = self.get_json(page_url, resource, None).await?;
            pages += 1;
            entities.extend(page.resources.into_iter().map(Resource::into_entity));
            next = page.next_url.map(|n| self.endpoint(&n)).transpose()?;
        }

        debug!(
            resource,
            %query,
            pages,
            results = entities.len(),
            "Listed catalog resources"
        );
        Ok(entities)
    }

    async fn get<T: CatalogEntity>(
        &self,
        collection: &str,
        resource: &'static str,
        guid: &str,
    ) -> CatalogResult<T> {
        let url = self.endpoint(&format!("v2/{collection}/{guid}"))?;
        let found: Resource<T> = self.get_json(url, resource, Some(guid)).await?;
        Ok(found.into_entity())
    }

    async fn get_json<R: DeserializeOwned>(
        &self,
        url: Url,
        resource: &'static str,
        guid: Option<&str>,
    ) -> CatalogResult<R> {
        trace!(%url, "GET");
        let mut request = self.http.get(url);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => CatalogError::Unauthorized { message: body },
                404 if guid.is_some() => CatalogError::NotFound {
                    resource,
                    guid: guid.unwrap_or_default().to_string(),
                },
                code => CatalogError::Api {
                    status: code,
                    message: body,
                },
            });
        }

        response
            .json::<R>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn list_services(&self, query: &Query) -> CatalogResult<Vec<ServiceClass>> {
        self.list("v2/services", "service", query).await
    }

    async fn list_service_plans(&self, query: &Query) -> CatalogResult<Vec<ServicePlan>> {
        self.list("v2/service_plans", "service plan", query).await
    }

    async fn list_service_instances(&self, query: &Query) -> CatalogResult<Vec<ServiceInstance>> {
        self.list("v2/service_instances", "service instance", query)
            .await
    }

    async fn list_service_bindings(&self, query: &Query) -> CatalogResult<Vec<ServiceBinding>> {
        self.list("v2/service_bindings", "service binding", query)
            .await
    }

    async fn list_service_keys(&self, query: &Query) -> CatalogResult<Vec<ServiceKey>> {
        self.list("v2/service_keys", "service key", query).await
    }

    async fn get_app(&self, guid: &str) -> CatalogResult<App> {
        self.get("apps", "app", guid).await
    }

    async fn get_space(&self, guid: &str) -> CatalogResult<Space> {
        self.get("spaces", "space", guid).await
    }

    async fn get_org(&self, guid: &str) -> CatalogResult<Org> {
        self.get("organizations", "organization", guid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_bearer_prefix() {
        assert_eq!(strip_bearer("bearer abc.def"), "abc.def");
        assert_eq!(strip_bearer("Bearer abc.def"), "abc.def");
        assert_eq!(strip_bearer("  abc.def \n"), "abc.def");
    }

    #[test]
    fn test_builder_requires_url() {
        let err = HttpCatalogClient::builder().build().unwrap_err();
        assert!(matches!(err, CatalogError::InvalidUrl(_)));
    }

    #[test]
    fn test_builder_rejects_bad_url() {
        let err = HttpCatalogClient::builder()
            .base_url("not a url")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("not a url"));
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let client = HttpCatalogClient::builder()
            .base_url("https://api.example.com/cf")
            .build()
            .unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/cf/");
        assert_eq!(
            client.endpoint("v2/apps/app1-guid").unwrap().as_str(),
            "https://api.example.com/cf/v2/apps/app1-guid"
        );
        assert_eq!(
            client
                .endpoint("/v2/service_plans?page=2&results-per-page=50")
                .unwrap()
                .as_str(),
            "https://api.example.com/cf/v2/service_plans?page=2&results-per-page=50"
        );
    }

    #[test]
    fn test_endpoint_at_host_root() {
        let client = HttpCatalogClient::builder()
            .base_url("https://api.example.com")
            .build()
            .unwrap();
        assert_eq!(
            client.endpoint("/v2/services").unwrap().as_str(),
            "https://api.example.com/v2/services"
        );
    }

    #[test]
    fn test_page_decoding_fills_guid_from_metadata() {
        let body = r#"{
            "total_results": 1,
            "total_pages": 1,
            "next_url": null,
            "resources": [
                {"metadata": {"guid": "small-guid"}, "entity": {"name": "small", "service_guid": "service-guid"}}
            ]
        }"#;
        let page: Page<ServicePlan> = serde_json::from_str(body).unwrap();
        let plans: Vec<ServicePlan> = page.resources.into_iter().map(Resource::into_entity).collect();
        assert_eq!(
            plans,
            vec![ServicePlan {
                guid: "small-guid".to_string(),
                name: "small".to_string(),
                service_guid: "service-guid".to_string(),
            }]
        );
    }
}
