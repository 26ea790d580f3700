//! Single-predicate catalog filters

use std::fmt;

/// Field names the catalog accepts in `q` filters
pub mod fields {
    pub const LABEL: &str = "label";
    pub const SERVICE_GUID: &str = "service_guid";
    pub const SERVICE_PLAN_GUID: &str = "service_plan_guid";
    pub const SERVICE_INSTANCE_GUID: &str = "service_instance_guid";
}

/// An equality predicate on one field, rendered as `field:value`
///
/// Every filtered list call carries exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    field: &'static str,
    value: String,
}

impl Query {
    /// Build a `field:value` predicate
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
        }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.field, self.value)
    }
}
