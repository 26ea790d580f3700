//! Upward resolution from bindings to their owning org and space

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::catalog::{App, CatalogClient, ServiceBinding, ServiceInstance, ServiceKey};

use super::error::{DiscoveryError, Reference, Result};
use super::record::{BindingKind, BindingRecord};

/// Org and space names shared by every record of one service instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceContext {
    pub org_name: String,
    pub space_name: String,
}

/// Lookups memoized while a single instance is correlated
///
/// Created when the instance is entered and dropped when it is left; nothing
/// carries over to the next instance.
#[derive(Debug, Default)]
struct InstanceContext {
    space: Option<SpaceContext>,
    apps: HashMap<String, App>,
}

/// Turns one instance's bindings and keys into records
///
/// The org/space pair is resolved once, through the app of the first
/// binding, and reused for every other binding and key of the instance.
/// Keys carry no app reference; an instance with keys but no bindings
/// yields key records with `org_name`/`space_name` left empty.
pub struct Correlator<'a, C: ?Sized> {
    client: &'a C,
}

impl<'a, C: CatalogClient + ?Sized> Correlator<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub async fn correlate(
        &self,
        instance: &ServiceInstance,
        bindings: &[ServiceBinding],
        keys: &[ServiceKey],
    ) -> Result<Vec<BindingRecord>> {
        let mut context = InstanceContext::default();
        let mut records = Vec::with_capacity(bindings.len() + keys.len());

        for binding in bindings {
            let app = self.app(&mut context, instance, &binding.app_guid).await?;
            if context.space.is_none() {
                context.space = Some(self.space_context(instance, &app).await?);
            }
            records.push(BindingRecord::new(
                BindingKind::AppBinding,
                &app.name,
                instance,
                context.space.as_ref(),
            ));
        }

        if !keys.is_empty() && context.space.is_none() {
            warn!(
                instance = %instance.name,
                keys = keys.len(),
                "Service instance has keys but no app bindings; org and space are unknown"
            );
        }

        for key in keys {
            records.push(BindingRecord::new(
                BindingKind::ServiceKeyBinding,
                &key.name,
                instance,
                context.space.as_ref(),
            ));
        }

        debug!(
            instance = %instance.name,
            bindings = bindings.len(),
            keys = keys.len(),
            apps_fetched = context.apps.len(),
            "Correlated service instance"
        );
        Ok(records)
    }

    async fn app(
        &self,
        context: &mut InstanceContext,
        instance: &ServiceInstance,
        guid: &str,
    ) -> Result<App> {
        if let Some(app) = context.apps.get(guid) {
            return Ok(app.clone());
        }

        let app = self
            .client
            .get_app(guid)
            .await
            .map_err(|e| DiscoveryError::reference(Reference::App, guid, &instance.guid, e))?;
        context.apps.insert(guid.to_string(), app.clone());
        Ok(app)
    }

    async fn space_context(&self, instance: &ServiceInstance, app: &App) -> Result<SpaceContext> {
        let space = self
            .client
            .get_space(&app.space_guid)
            .await
            .map_err(|e| {
                DiscoveryError::reference(Reference::Space, &app.space_guid, &instance.guid, e)
            })?;

        let org = self
            .client
            .get_org(&space.organization_guid)
            .await
            .map_err(|e| {
                DiscoveryError::reference(
                    Reference::Org,
                    &space.organization_guid,
                    &instance.guid,
                    e,
                )
            })?;

        Ok(SpaceContext {
            org_name: org.name,
            space_name: space.name,
        })
    }
}
