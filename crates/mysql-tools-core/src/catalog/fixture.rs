//! In-memory catalog that records every call, for unit tests

use std::sync::Mutex;

use async_trait::async_trait;

use super::client::{CatalogClient, CatalogError, CatalogResult};
use super::model::{
    App, Org, ServiceBinding, ServiceClass, ServiceInstance, ServiceKey, ServicePlan, Space,
};
use super::query::{Query, fields};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ListServices(String),
    ListPlans(String),
    ListInstances(String),
    ListBindings(String),
    ListKeys(String),
    GetApp(String),
    GetSpace(String),
    GetOrg(String),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingCatalog {
    pub services: Vec<ServiceClass>,
    pub plans: Vec<ServicePlan>,
    pub instances: Vec<ServiceInstance>,
    pub bindings: Vec<ServiceBinding>,
    pub keys: Vec<ServiceKey>,
    pub apps: Vec<App>,
    pub spaces: Vec<Space>,
    pub orgs: Vec<Org>,
    /// Any call equal to this one fails with a 500
    pub fail_on: Option<Call>,
    calls: Mutex<Vec<Call>>,
}

impl RecordingCatalog {
    /// `p.mysql` with plans small, medium and large:
    /// small holds instance1 (bound to app1, keyed) and instance2 (unused),
    /// medium holds instance3 (bound to app3, keyed), large holds nothing.
    pub fn mysql() -> Self {
        let mut catalog = Self {
            services: vec![ServiceClass {
                guid: "service-guid".to_string(),
                label: "p.mysql".to_string(),
            }],
            ..Self::default()
        };
        for plan in ["small", "medium", "large"] {
            catalog.plans.push(ServicePlan {
                guid: format!("{plan}-guid"),
                name: plan.to_string(),
                service_guid: "service-guid".to_string(),
            });
        }
        catalog.add_instance("instance1", "small-guid", "space1-guid");
        catalog.add_instance("instance2", "small-guid", "space2-guid");
        catalog.add_instance("instance3", "medium-guid", "space3-guid");

        catalog.add_app("app1", "space1-guid");
        catalog.add_app("app3", "space3-guid");
        catalog.add_space("space1-guid", "app1-space", "app1-org-guid", "app1-org");
        catalog.add_space("space3-guid", "app3-space", "app3-org-guid", "app3-org");

        catalog.add_binding("binding1-guid", "app1-guid", "instance1-guid");
        catalog.add_binding("binding3-guid", "app3-guid", "instance3-guid");
        catalog.add_key("key1", "instance1-guid");
        catalog.add_key("key3", "instance3-guid");
        catalog
    }

    pub fn add_instance(&mut self, name: &str, plan_guid: &str, space_guid: &str) {
        self.instances.push(ServiceInstance {
            guid: format!("{name}-guid"),
            name: name.to_string(),
            service_plan_guid: plan_guid.to_string(),
            space_guid: space_guid.to_string(),
        });
    }

    pub fn add_app(&mut self, name: &str, space_guid: &str) {
        self.apps.push(App {
            guid: format!("{name}-guid"),
            name: name.to_string(),
            space_guid: space_guid.to_string(),
        });
    }

    pub fn add_space(&mut self, guid: &str, name: &str, org_guid: &str, org_name: &str) {
        self.spaces.push(Space {
            guid: guid.to_string(),
            name: name.to_string(),
            organization_guid: org_guid.to_string(),
        });
        self.orgs.push(Org {
            guid: org_guid.to_string(),
            name: org_name.to_string(),
        });
    }

    pub fn add_binding(&mut self, guid: &str, app_guid: &str, instance_guid: &str) {
        self.bindings.push(ServiceBinding {
            guid: guid.to_string(),
            app_guid: app_guid.to_string(),
            service_instance_guid: instance_guid.to_string(),
        });
    }

    pub fn add_key(&mut self, name: &str, instance_guid: &str) {
        self.keys.push(ServiceKey {
            guid: format!("{name}-guid"),
            name: name.to_string(),
            service_instance_guid: instance_guid.to_string(),
        });
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn count(&self, matches: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| matches(c)).count()
    }

    fn record(&self, call: Call) -> CatalogResult<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.clone());
        }
        if self.fail_on.as_ref() == Some(&call) {
            return Err(CatalogError::Api {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }

    fn filter<T: Clone>(
        items: &[T],
        query: &Query,
        expected_field: &str,
        field: impl Fn(&T) -> &str,
    ) -> Vec<T> {
        assert_eq!(query.field(), expected_field, "unexpected filter field");
        items
            .iter()
            .filter(|item| field(item) == query.value())
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CatalogClient for RecordingCatalog {
    async fn list_services(&self, query: &Query) -> CatalogResult<Vec<ServiceClass>> {
        self.record(Call::ListServices(query.to_string()))?;
        Ok(Self::filter(&self.services, query, fields::LABEL, |s| &s.label))
    }

    async fn list_service_plans(&self, query: &Query) -> CatalogResult<Vec<ServicePlan>> {
        self.record(Call::ListPlans(query.to_string()))?;
        Ok(Self::filter(&self.plans, query, fields::SERVICE_GUID, |p| {
            &p.service_guid
        }))
    }

    async fn list_service_instances(&self, query: &Query) -> CatalogResult<Vec<ServiceInstance>> {
        self.record(Call::ListInstances(query.to_string()))?;
        Ok(Self::filter(
            &self.instances,
            query,
            fields::SERVICE_PLAN_GUID,
            |i| &i.service_plan_guid,
        ))
    }

    async fn list_service_bindings(&self, query: &Query) -> CatalogResult<Vec<ServiceBinding>> {
        self.record(Call::ListBindings(query.to_string()))?;
        Ok(Self::filter(
            &self.bindings,
            query,
            fields::SERVICE_INSTANCE_GUID,
            |b| &b.service_instance_guid,
        ))
    }

    async fn list_service_keys(&self, query: &Query) -> CatalogResult<Vec<ServiceKey>> {
        self.record(Call::ListKeys(query.to_string()))?;
        Ok(Self::filter(
            &self.keys,
            query,
            fields::SERVICE_INSTANCE_GUID,
            |k| &k.service_instance_guid,
        ))
    }

    async fn get_app(&self, guid: &str) -> CatalogResult<App> {
        self.record(Call::GetApp(guid.to_string()))?;
        find(&self.apps, "app", guid, |a| &a.guid)
    }

    async fn get_space(&self, guid: &str) -> CatalogResult<Space> {
        self.record(Call::GetSpace(guid.to_string()))?;
        find(&self.spaces, "space", guid, |s| &s.guid)
    }

    async fn get_org(&self, guid: &str) -> CatalogResult<Org> {
        self.record(Call::GetOrg(guid.to_string()))?;
        find(&self.orgs, "organization", guid, |o| &o.guid)
    }
}

fn find<T: Clone>(
    items: &[T],
    resource: &'static str,
    guid: &str,
    key: impl Fn(&T) -> &str,
) -> CatalogResult<T> {
    items
        .iter()
        .find(|item| key(item) == guid)
        .cloned()
        .ok_or_else(|| CatalogError::NotFound {
            resource,
            guid: guid.to_string(),
        })
}
