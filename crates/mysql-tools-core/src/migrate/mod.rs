//! Donor-to-recipient service instance migration
//!
//! A linear workflow: check the donor exists, provision a recipient
//! instance, copy the data with a short-lived migration app, then swap the
//! instance names. Provisioning and copying failures optionally delete the
//! recipient instance before the error is returned.

mod error;
mod migrator;
mod platform;
mod progress;
mod unpack;
mod workflow;

pub use error::{CleanupOutcome, MigrationError, PlatformError, PlatformResult, Result};
pub use migrator::{DEFAULT_LOG_WAIT, Migrator};
pub use platform::{CfCliPlatform, PlatformClient};
pub use progress::{MigrationEvent, MigrationProgressCallback, WorkflowStep};
pub use unpack::{TarballUnpacker, Unpacker};
pub use workflow::{DEFAULT_PRODUCT_NAME, MigrationRequest};

#[cfg(test)]
pub(crate) use platform::MockPlatformClient;
#[cfg(test)]
pub(crate) use unpack::MockUnpacker;
