//! The catalog client seam and its error type

use async_trait::async_trait;
use thiserror::Error;

use super::model::{
    App, Org, ServiceBinding, ServiceClass, ServiceInstance, ServiceKey, ServicePlan, Space,
};
use super::query::Query;

/// Result type for catalog calls
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Errors raised by a catalog client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{resource} {guid} not found")]
    NotFound { resource: &'static str, guid: String },

    #[error("not authorized: {message}")]
    Unauthorized { message: String },

    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("connection error: {0}")]
    Connection(String),

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid catalog URL: {0}")]
    InvalidUrl(String),
}

impl CatalogError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound { .. })
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CatalogError::Unauthorized { .. })
    }

    /// Returns true if a later attempt could succeed (transport faults and 5xx)
    ///
    /// Nothing in this crate retries; the flag is surfaced to callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::Connection(_) => true,
            CatalogError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Filtered-list and get-by-guid access to the service catalog
///
/// Implementations are expected to handle authentication and pagination;
/// a list call returns every matching entity in catalog order.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn list_services(&self, query: &Query) -> CatalogResult<Vec<ServiceClass>>;

    async fn list_service_plans(&self, query: &Query) -> CatalogResult<Vec<ServicePlan>>;

    async fn list_service_instances(&self, query: &Query) -> CatalogResult<Vec<ServiceInstance>>;

    async fn list_service_bindings(&self, query: &Query) -> CatalogResult<Vec<ServiceBinding>>;

    async fn list_service_keys(&self, query: &Query) -> CatalogResult<Vec<ServiceKey>>;

    async fn get_app(&self, guid: &str) -> CatalogResult<App>;

    async fn get_space(&self, guid: &str) -> CatalogResult<Space>;

    async fn get_org(&self, guid: &str) -> CatalogResult<Org>;
}
