//! Binding discovery
//!
//! Walks a service's catalog hierarchy top-down and flattens every app
//! binding and service key into a [`BindingRecord`] carrying the org and
//! space it belongs to.
//!
//! Output order is a contract: plans in catalog order, instances in catalog
//! order within each plan, app bindings before service keys within each
//! instance, and list order within each of those.

mod correlator;
mod error;
mod finder;
mod record;


pub use correlator::{Correlator, SpaceContext};
pub use error::{CatalogLevel, DiscoveryError, Reference, Result};
pub use finder::BindingFinder;
pub use record::{BindingKind, BindingRecord};
