//! Progress events for the migration workflow
//!
//! The CLI turns these into status lines; library callers can ignore them.

use std::fmt;

/// Steps of the migration workflow, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    CheckSource,
    CreateServiceInstance,
    MigrateData,
    RenameServiceInstances,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WorkflowStep::CheckSource => "checking source service instance",
            WorkflowStep::CreateServiceInstance => "creating service instance",
            WorkflowStep::MigrateData => "migrating data",
            WorkflowStep::RenameServiceInstances => "renaming service instances",
        };
        f.write_str(text)
    }
}

/// Progress events emitted during a migration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationEvent {
    Started { source: String, recipient: String },
    StepStarted(WorkflowStep),
    StepCompleted(WorkflowStep),
    /// Recent logs of the migration app, fetched after its task failed
    TaskLogs { app: String, logs: String },
    CleanupAttempted { recipient: String },
    /// The recipient could not be deleted and must be removed by hand
    CleanupFailed { recipient: String, reason: String },
    Completed { source: String },
}

/// Callback type for progress updates
pub type MigrationProgressCallback = Box<dyn Fn(MigrationEvent) + Send + Sync>;
