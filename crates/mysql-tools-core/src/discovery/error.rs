//! Discovery errors
//!
//! Every failure carries the level and parent it happened under, so
//! "failed listing service instances for plan X" reads differently from
//! "failed resolving app Y for instance Z".

use std::fmt;
use thiserror::Error;

use crate::catalog::CatalogError;

/// Result type for discovery
pub type Result<T> = std::result::Result<T, DiscoveryError>;

/// Hierarchy level of a failed list call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogLevel {
    Services,
    ServicePlans,
    ServiceInstances,
    ServiceBindings,
    ServiceKeys,
}

impl CatalogLevel {
    fn parent_kind(self) -> &'static str {
        match self {
            CatalogLevel::Services => "label",
            CatalogLevel::ServicePlans => "service",
            CatalogLevel::ServiceInstances => "service plan",
            CatalogLevel::ServiceBindings | CatalogLevel::ServiceKeys => "service instance",
        }
    }
}

impl fmt::Display for CatalogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CatalogLevel::Services => "services",
            CatalogLevel::ServicePlans => "service plans",
            CatalogLevel::ServiceInstances => "service instances",
            CatalogLevel::ServiceBindings => "service bindings",
            CatalogLevel::ServiceKeys => "service keys",
        };
        f.write_str(name)
    }
}

/// Kind of point lookup made while correlating a binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    App,
    Space,
    Org,
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::App => write!(f, "app"),
            Reference::Space => write!(f, "space"),
            Reference::Org => write!(f, "organization"),
        }
    }
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// A filtered list call failed
    #[error("failed listing {level} for {} {parent}: {source}", .level.parent_kind())]
    CatalogQuery {
        level: CatalogLevel,
        parent: String,
        #[source]
        source: CatalogError,
    },

    /// An app, space or org referenced by a binding could not be fetched
    #[error("failed resolving {reference} {guid} for service instance {instance_guid}: {source}")]
    ReferenceResolution {
        reference: Reference,
        guid: String,
        instance_guid: String,
        #[source]
        source: CatalogError,
    },

    /// More than one service class carries the label
    #[error("label '{label}' matched {matches} services; expected exactly one")]
    AmbiguousServiceClass { label: String, matches: usize },
}

impl DiscoveryError {
    pub(crate) fn query(level: CatalogLevel, parent: &str, source: CatalogError) -> Self {
        DiscoveryError::CatalogQuery {
            level,
            parent: parent.to_string(),
            source,
        }
    }

    pub(crate) fn reference(
        reference: Reference,
        guid: &str,
        instance_guid: &str,
        source: CatalogError,
    ) -> Self {
        DiscoveryError::ReferenceResolution {
            reference,
            guid: guid.to_string(),
            instance_guid: instance_guid.to_string(),
            source,
        }
    }

    /// The underlying catalog failure, if any
    pub fn catalog_error(&self) -> Option<&CatalogError> {
        match self {
            DiscoveryError::CatalogQuery { source, .. }
            | DiscoveryError::ReferenceResolution { source, .. } => Some(source),
            DiscoveryError::AmbiguousServiceClass { .. } => None,
        }
    }
}
