//! Migration and platform errors

use thiserror::Error;

use super::progress::WorkflowStep;

/// Result type for migration operations
pub type Result<T> = std::result::Result<T, MigrationError>;

/// Result type for platform calls
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

/// Errors raised by a [`PlatformClient`](super::PlatformClient)
#[derive(Error, Debug)]
pub enum PlatformError {
    #[error("`cf {command}` failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("failed to run cf CLI: {0}")]
    Io(#[from] std::io::Error),

    #[error("unexpected cf output: {0}")]
    UnexpectedOutput(String),

    #[error("timed out after {seconds}s waiting for {what}")]
    Timeout { what: String, seconds: u64 },

    #[error("{what} failed: {message}")]
    Failed { what: String, message: String },
}

/// What happened to the recipient instance after a failed step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupOutcome {
    /// The recipient was deleted
    Attempted,
    /// The recipient could not be deleted and is left behind
    Failed { reason: String },
    Skipped,
}

impl CleanupOutcome {
    fn describe(&self, recipient: &str) -> String {
        match self {
            CleanupOutcome::Attempted => format!("Attempting to clean up service {recipient}"),
            CleanupOutcome::Failed { reason } => {
                format!("Failed to clean up service {recipient}: {reason}")
            }
            CleanupOutcome::Skipped => format!("Not cleaning up service {recipient}"),
        }
    }
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Service instance {0} not found")]
    ServiceNotFound(String),

    #[error("Error creating service instance: {0}")]
    CreateInstance(#[source] PlatformError),

    #[error("Error obtaining hostname for new service instance: {0}")]
    Hostnames(#[source] PlatformError),

    #[error("Error configuring service instance {name}: {source}")]
    Configure {
        name: String,
        #[source]
        source: PlatformError,
    },

    #[error("Error creating temp directory: {0}")]
    TempDir(#[source] std::io::Error),

    #[error("Error extracting migrate assets: {0}")]
    Unpack(#[source] std::io::Error),

    #[error("failed to push application: {0}")]
    PushApp(#[source] PlatformError),

    #[error("failed to bind-service {service:?} to application {app:?}: {source}")]
    Bind {
        app: String,
        service: String,
        #[source]
        source: PlatformError,
    },

    #[error("failed to start application {app:?}: {source}")]
    StartApp {
        app: String,
        #[source]
        source: PlatformError,
    },

    #[error("migration task failed: {0}")]
    Task(#[source] PlatformError),

    #[error("Error renaming service instance {name}: {source}")]
    Rename {
        name: String,
        #[source]
        source: PlatformError,
    },

    #[error("Error deleting service instance {name}: {source}")]
    Cleanup {
        name: String,
        #[source]
        source: PlatformError,
    },

    /// A provisioning or copy step failed; the recipient may have been cleaned up
    #[error("error {step}: {source}. {}", .cleanup.describe(.recipient))]
    Aborted {
        step: WorkflowStep,
        recipient: String,
        cleanup: CleanupOutcome,
        #[source]
        source: Box<MigrationError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aborted_message_mentions_cleanup() {
        let err = MigrationError::Aborted {
            step: WorkflowStep::CreateServiceInstance,
            recipient: "db-new".to_string(),
            cleanup: CleanupOutcome::Attempted,
            source: Box::new(MigrationError::CreateInstance(PlatformError::CommandFailed {
                command: "create-service".to_string(),
                message: "quota exceeded".to_string(),
            })),
        };
        assert_eq!(
            err.to_string(),
            "error creating service instance: Error creating service instance: `cf create-service` failed: quota exceeded. Attempting to clean up service db-new"
        );
    }

    #[test]
    fn test_aborted_message_without_cleanup() {
        let err = MigrationError::Aborted {
            step: WorkflowStep::MigrateData,
            recipient: "db-new".to_string(),
            cleanup: CleanupOutcome::Skipped,
            source: Box::new(MigrationError::Task(PlatformError::Failed {
                what: "task migrate".to_string(),
                message: "exit status 1".to_string(),
            })),
        };
        assert!(err.to_string().starts_with("error migrating data: "));
        assert!(err.to_string().ends_with("Not cleaning up service db-new"));
    }

    #[test]
    fn test_aborted_message_reports_failed_cleanup() {
        let err = MigrationError::Aborted {
            step: WorkflowStep::CreateServiceInstance,
            recipient: "db-new".to_string(),
            cleanup: CleanupOutcome::Failed {
                reason: "forbidden".to_string(),
            },
            source: Box::new(MigrationError::Hostnames(PlatformError::UnexpectedOutput(
                "no hosts".to_string(),
            ))),
        };
        assert!(
            err.to_string()
                .ends_with("Failed to clean up service db-new: forbidden")
        );
    }
}
