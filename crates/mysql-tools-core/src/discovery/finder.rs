//! Top-down traversal of the catalog hierarchy

use tracing::{debug, info};

use crate::catalog::{CatalogClient, Query, ServiceClass, fields};

use super::correlator::Correlator;
use super::error::{CatalogLevel, DiscoveryError, Result};
use super::record::BindingRecord;

/// Finds every app binding and service key of a service
///
/// Holds no state between calls; each [`find_bindings`](Self::find_bindings)
/// is one complete traversal. Calls are issued strictly one after another,
/// depth-first, and the first failing call aborts the traversal with no
/// partial output.
pub struct BindingFinder<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: CatalogClient + ?Sized> BindingFinder<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Discover the bindings and keys of the service with the given label
    ///
    /// An unknown label is a normal outcome and yields no records. A label
    /// shared by several services is rejected with
    /// [`DiscoveryError::AmbiguousServiceClass`].
    pub async fn find_bindings(&self, label: &str) -> Result<Vec<BindingRecord>> {
        let Some(service) = self.service(label).await? else {
            info!(label, "No service found with label");
            return Ok(Vec::new());
        };

        let plans = self
            .client
            .list_service_plans(&Query::eq(fields::SERVICE_GUID, &service.guid))
            .await
            .map_err(|e| DiscoveryError::query(CatalogLevel::ServicePlans, &service.guid, e))?;
        debug!(label, plans = plans.len(), "Listed service plans");

        let correlator = Correlator::new(self.client);
        let mut records = Vec::new();

        for plan in &plans {
            let instances = self
                .client
                .list_service_instances(&Query::eq(fields::SERVICE_PLAN_GUID, &plan.guid))
                .await
                .map_err(|e| DiscoveryError::query(CatalogLevel::ServiceInstances, &plan.guid, e))?;
            debug!(plan = %plan.name, instances = instances.len(), "Listed service instances");

            for instance in &instances {
                let by_instance = Query::eq(fields::SERVICE_INSTANCE_GUID, &instance.guid);

                let bindings = self
                    .client
                    .list_service_bindings(&by_instance)
                    .await
                    .map_err(|e| {
                        DiscoveryError::query(CatalogLevel::ServiceBindings, &instance.guid, e)
                    })?;
                let keys = self
                    .client
                    .list_service_keys(&by_instance)
                    .await
                    .map_err(|e| {
                        DiscoveryError::query(CatalogLevel::ServiceKeys, &instance.guid, e)
                    })?;

                records.extend(correlator.correlate(instance, &bindings, &keys).await?);
            }
        }

        info!(label, records = records.len(), "Binding discovery complete");
        Ok(records)
    }

    async fn service(&self, label: &str) -> Result<Option<ServiceClass>> {
        let mut services = self
            .client
            .list_services(&Query::eq(fields::LABEL, label))
            .await
            .map_err(|e| DiscoveryError::query(CatalogLevel::Services, label, e))?;

        match services.len() {
            0 | 1 => Ok(services.pop()),
            matches => Err(DiscoveryError::AmbiguousServiceClass {
                label: label.to_string(),
                matches,
            }),
        }
    }
}
