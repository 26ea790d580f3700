//! Catalog entities
//!
//! Snapshots fetched during a single traversal. Field names follow the
//! catalog's `entity` payloads; `guid` comes from the resource `metadata`
//! and is filled in by the client.

use serde::{Deserialize, Serialize};

/// A named category of provisionable service, matched by label
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceClass {
    #[serde(default)]
    pub guid: String,
    pub label: String,
}

/// A tier offered under a service class
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServicePlan {
    #[serde(default)]
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub service_guid: String,
}

/// A provisioned instance of a plan
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceInstance {
    #[serde(default)]
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub service_plan_guid: String,
    #[serde(default)]
    pub space_guid: String,
}

/// An instance's credentials attached to an app
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceBinding {
    #[serde(default)]
    pub guid: String,
    pub app_guid: String,
    #[serde(default)]
    pub service_instance_guid: String,
}

/// A standalone credential issued against an instance
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceKey {
    #[serde(default)]
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub service_instance_guid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct App {
    #[serde(default)]
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub space_guid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Space {
    #[serde(default)]
    pub guid: String,
    pub name: String,
    #[serde(default)]
    pub organization_guid: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Org {
    #[serde(default)]
    pub guid: String,
    pub name: String,
}

/// Entities whose identifier lives in resource metadata rather than the entity body
pub(crate) trait CatalogEntity: serde::de::DeserializeOwned + Send {
    fn with_guid(self, guid: String) -> Self;
}

macro_rules! impl_catalog_entity {
    ($($entity:ty),+ $(,)?) => {
        $(
            impl CatalogEntity for $entity {
                fn with_guid(mut self, guid: String) -> Self {
                    self.guid = guid;
                    self
                }
            }
        )+
    };
}

impl_catalog_entity!(
    ServiceClass,
    ServicePlan,
    ServiceInstance,
    ServiceBinding,
    ServiceKey,
    App,
    Space,
    Org,
);
