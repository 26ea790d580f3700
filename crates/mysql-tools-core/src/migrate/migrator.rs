//! Individual migration steps

use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::{MigrationError, Result};
use super::platform::PlatformClient;
use super::progress::{MigrationEvent, MigrationProgressCallback};
use super::unpack::Unpacker;

/// How long to wait before fetching logs of a failed migration task
pub const DEFAULT_LOG_WAIT: Duration = Duration::from_secs(5);

/// Runs migration steps against a [`PlatformClient`]
///
/// Each step is usable on its own; [`Migrator::run`] chains them into the
/// full workflow.
pub struct Migrator<C, U> {
    client: C,
    unpacker: U,
    log_wait: Duration,
    on_progress: Option<MigrationProgressCallback>,
}

impl<C: PlatformClient, U: Unpacker> Migrator<C, U> {
    pub fn new(client: C, unpacker: U) -> Self {
        Self {
            client,
            unpacker,
            log_wait: DEFAULT_LOG_WAIT,
            on_progress: None,
        }
    }

    pub fn with_log_wait(mut self, log_wait: Duration) -> Self {
        self.log_wait = log_wait;
        self
    }

    pub fn with_progress(mut self, callback: MigrationProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    pub(crate) fn emit(&self, event: MigrationEvent) {
        if let Some(cb) = &self.on_progress {
            cb(event);
        }
    }

    pub async fn check_service_exists(&self, donor: &str) -> Result<()> {
        if !self.client.service_exists(donor).await {
            return Err(MigrationError::ServiceNotFound(donor.to_string()));
        }
        Ok(())
    }

    /// Provision `name` and enable TLS for every hostname it reports
    pub async fn create_and_configure_service_instance(
        &self,
        product: &str,
        plan: &str,
        name: &str,
    ) -> Result<()> {
        info!(product, plan, name, "Creating service instance");
        self.client
            .create_service_instance(product, plan, name)
            .await
            .map_err(MigrationError::CreateInstance)?;

        let hostnames = match self.client.get_hostnames(name).await {
            Ok(hostnames) => hostnames,
            Err(e) => {
                if let Err(delete_err) = self.client.delete_service_instance(name).await {
                    warn!(name, error = %delete_err, "Failed to delete service instance");
                }
                return Err(MigrationError::Hostnames(e));
            }
        };
        debug!(name, ?hostnames, "Enabling TLS");

        self.client
            .update_service_config(name, &json!({ "enable_tls": hostnames }))
            .await
            .map_err(|source| MigrationError::Configure {
                name: name.to_string(),
                source,
            })
    }

    /// Copy data from `donor` to `recipient` using a temporary app
    ///
    /// Once pushed, the app is deleted afterwards whether or not the copy
    /// succeeded. A failed push leaves nothing to delete.
    pub async fn migrate_data(&self, donor: &str, recipient: &str) -> Result<()> {
        let dir = tempfile::Builder::new()
            .prefix("migrate_app_")
            .tempdir()
            .map_err(MigrationError::TempDir)?;
        self.unpacker
            .unpack(dir.path())
            .map_err(MigrationError::Unpack)?;

        let app = format!("migrate-app-{}", Uuid::new_v4());
        self.client
            .push_app(dir.path(), &app)
            .await
            .map_err(MigrationError::PushApp)?;

        let result = self.run_migration_app(&app, donor, recipient).await;

        if let Err(e) = self.client.delete_app(&app).await {
            warn!(app = %app, error = %e, "Failed to delete migration app");
        }
        result
    }

    async fn run_migration_app(&self, app: &str, donor: &str, recipient: &str) -> Result<()> {
        for service in [donor, recipient] {
            self.client
                .bind_service(app, service)
                .await
                .map_err(|source| MigrationError::Bind {
                    app: app.to_string(),
                    service: service.to_string(),
                    source,
                })?;
        }

        self.client
            .start_app(app)
            .await
            .map_err(|source| MigrationError::StartApp {
                app: app.to_string(),
                source,
            })?;

        info!(app, donor, recipient, "Running migration task");
        let command = format!("./migrate {donor} {recipient}");
        if let Err(e) = self.client.run_task(app, &command).await {
            warn!(app, error = %e, "Migration task failed; fetching recent logs");
            tokio::time::sleep(self.log_wait).await;
            match self.client.recent_logs(app).await {
                Ok(logs) => self.emit(MigrationEvent::TaskLogs {
                    app: app.to_string(),
                    logs,
                }),
                Err(log_err) => warn!(app, error = %log_err, "Failed to fetch recent logs"),
            }
            return Err(MigrationError::Task(e));
        }
        Ok(())
    }

    /// Swap names so `recipient` takes over `donor`'s name
    pub async fn rename_service_instances(&self, donor: &str, recipient: &str) -> Result<()> {
        let retired = format!("{donor}-old");
        self.client
            .rename_service(donor, &retired)
            .await
            .map_err(|source| MigrationError::Rename {
                name: donor.to_string(),
                source,
            })?;
        self.client
            .rename_service(recipient, donor)
            .await
            .map_err(|source| MigrationError::Rename {
                name: recipient.to_string(),
                source,
            })
    }

    /// Remove a partially provisioned recipient
    pub async fn cleanup_on_error(&self, recipient: &str) -> Result<()> {
        self.client
            .delete_service_instance(recipient)
            .await
            .map_err(|source| MigrationError::Cleanup {
                name: recipient.to_string(),
                source,
            })
    }
}
