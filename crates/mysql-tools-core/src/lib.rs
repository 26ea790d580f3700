//! # mysql-tools-core
//!
//! Shared engine behind the `mysql-tools` CLI.
//!
//! - [`catalog`] - the service catalog data model, the [`CatalogClient`] seam
//!   and an HTTP implementation against the v2 catalog API
//! - [`discovery`] - finds every app binding and service key attached to the
//!   instances of a service, resolving the owning org and space of each
//! - [`migrate`] - the donor-to-recipient data migration workflow with
//!   compensating cleanup
//! - [`config`] - profiles and config file handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use mysql_tools_core::{BindingFinder, HttpCatalogClient};
//!
//! let client = HttpCatalogClient::builder()
//!     .base_url("https://api.sys.example.com")
//!     .access_token(token)
//!     .build()?;
//!
//! for record in BindingFinder::new(&client).find_bindings("p.mysql").await? {
//!     println!("{} -> {} ({:?})", record.name, record.service_instance_name, record.kind);
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod migrate;

pub use catalog::{CatalogClient, CatalogError, HttpCatalogClient, Query};
pub use config::{Config, ConfigError, Profile};
pub use discovery::{BindingFinder, BindingKind, BindingRecord, DiscoveryError};
pub use migrate::{MigrationError, MigrationEvent, MigrationRequest, Migrator};
