//! The end-to-end migration workflow

use tracing::{info, warn};

use super::error::{CleanupOutcome, MigrationError, Result};
use super::migrator::Migrator;
use super::platform::PlatformClient;
use super::progress::{MigrationEvent, WorkflowStep};
use super::unpack::Unpacker;

/// Product used for the recipient instance when none is configured
pub const DEFAULT_PRODUCT_NAME: &str = "p.mysql";

/// Parameters for one donor-to-recipient migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationRequest {
    /// Name of the existing (donor) service instance
    pub source: String,
    /// Plan for the recipient instance
    pub plan: String,
    pub product_name: String,
    /// Delete the recipient instance if provisioning or copying fails
    pub cleanup: bool,
}

impl MigrationRequest {
    pub fn new(source: impl Into<String>, plan: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            plan: plan.into(),
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            cleanup: true,
        }
    }

    pub fn with_product_name(mut self, product_name: impl Into<String>) -> Self {
        self.product_name = product_name.into();
        self
    }

    pub fn with_cleanup(mut self, cleanup: bool) -> Self {
        self.cleanup = cleanup;
        self
    }

    /// Name the recipient instance is created under
    pub fn recipient(&self) -> String {
        format!("{}-new", self.source)
    }
}

impl<C: PlatformClient, U: Unpacker> Migrator<C, U> {
    /// Migrate `request.source` onto a freshly provisioned instance
    ///
    /// On success the new instance carries the source's name and the source
    /// is renamed to `<source>-old`.
    pub async fn run(&self, request: &MigrationRequest) -> Result<()> {
        let donor = request.source.as_str();
        let recipient = request.recipient();
        self.emit(MigrationEvent::Started {
            source: donor.to_string(),
            recipient: recipient.clone(),
        });

        self.emit(MigrationEvent::StepStarted(WorkflowStep::CheckSource));
        self.check_service_exists(donor).await?;
        self.emit(MigrationEvent::StepCompleted(WorkflowStep::CheckSource));

        info!("Triggers, routines and events are not migrated");

        self.emit(MigrationEvent::StepStarted(WorkflowStep::CreateServiceInstance));
        let created = self
            .create_and_configure_service_instance(&request.product_name, &request.plan, &recipient)
            .await;
        self.abort_on_error(WorkflowStep::CreateServiceInstance, request, &recipient, created)
            .await?;
        self.emit(MigrationEvent::StepCompleted(WorkflowStep::CreateServiceInstance));

        self.emit(MigrationEvent::StepStarted(WorkflowStep::MigrateData));
        let migrated = self.migrate_data(donor, &recipient).await;
        self.abort_on_error(WorkflowStep::MigrateData, request, &recipient, migrated)
            .await?;
        self.emit(MigrationEvent::StepCompleted(WorkflowStep::MigrateData));

        self.emit(MigrationEvent::StepStarted(WorkflowStep::RenameServiceInstances));
        self.rename_service_instances(donor, &recipient).await?;
        self.emit(MigrationEvent::StepCompleted(WorkflowStep::RenameServiceInstances));

        info!(source = donor, "Migration complete");
        self.emit(MigrationEvent::Completed {
            source: donor.to_string(),
        });
        Ok(())
    }

    async fn abort_on_error(
        &self,
        step: WorkflowStep,
        request: &MigrationRequest,
        recipient: &str,
        result: Result<()>,
    ) -> Result<()> {
        let Err(source) = result else {
            return Ok(());
        };

        let cleanup = if !request.cleanup {
            CleanupOutcome::Skipped
        } else {
            self.emit(MigrationEvent::CleanupAttempted {
                recipient: recipient.to_string(),
            });
            match self.cleanup_on_error(recipient).await {
                Ok(()) => CleanupOutcome::Attempted,
                Err(e) => {
                    warn!(recipient, error = %e, "Failed to clean up service instance");
                    let reason = match &e {
                        MigrationError::Cleanup { source, .. } => source.to_string(),
                        other => other.to_string(),
                    };
                    self.emit(MigrationEvent::CleanupFailed {
                        recipient: recipient.to_string(),
                        reason: reason.clone(),
                    });
                    CleanupOutcome::Failed { reason }
                }
            }
        };

        Err(MigrationError::Aborted {
            step,
            recipient: recipient.to_string(),
            cleanup,
            source: Box::new(source),
        })
    }
}
