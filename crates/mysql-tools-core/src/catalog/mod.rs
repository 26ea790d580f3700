//! Service catalog access
//!
//! The catalog is a hierarchy of paginated resources:
//! service class → plan → instance → binding / key, with apps, spaces and
//! orgs reachable by point lookup. Everything above the [`CatalogClient`]
//! trait is transport-agnostic; [`HttpCatalogClient`] is the v2 REST
//! implementation.

mod client;
#[cfg(test)]
pub(crate) mod fixture;
mod http;
mod model;
mod query;

pub use client::{CatalogClient, CatalogError, CatalogResult};
pub use http::{HttpCatalogClient, HttpCatalogClientBuilder};
pub use model::{App, Org, ServiceBinding, ServiceClass, ServiceInstance, ServiceKey, ServicePlan, Space};
pub use query::{Query, fields};
