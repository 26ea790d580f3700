use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::ServiceInstance;

use super::correlator::SpaceContext;

/// What a discovered record is attached through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindingKind {
    AppBinding,
    ServiceKeyBinding,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BindingKind::AppBinding => write!(f, "AppBinding"),
            BindingKind::ServiceKeyBinding => write!(f, "ServiceKeyBinding"),
        }
    }
}

/// One flattened discovery result
///
/// `org_name` and `space_name` are `None` only for service keys of an
/// instance that has no app bindings to derive them from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingRecord {
    pub name: String,
    pub service_instance_name: String,
    pub service_instance_guid: String,
    pub org_name: Option<String>,
    pub space_name: Option<String>,
    #[serde(rename = "type")]
    pub kind: BindingKind,
}

impl BindingRecord {
    pub(crate) fn new(
        kind: BindingKind,
        name: &str,
        instance: &ServiceInstance,
        context: Option<&SpaceContext>,
    ) -> Self {
        Self {
            name: name.to_string(),
            service_instance_name: instance.name.clone(),
            service_instance_guid: instance.guid.clone(),
            org_name: context.map(|c| c.org_name.clone()),
            space_name: context.map(|c| c.space_name.clone()),
            kind,
        }
    }
}
