//! `migrate` command

use std::path::PathBuf;

use colored::Colorize;
use mysql_tools_core::migrate::{
    CfCliPlatform, MigrationEvent, MigrationProgressCallback, MigrationRequest, Migrator,
    TarballUnpacker,
};
use tracing::debug;

use crate::connection::ConnectionManager;
use crate::error::Result;

/// Arguments of the `migrate` subcommand
#[derive(Debug)]
pub struct MigrateArgs<'a> {
    pub source: &'a str,
    pub plan: &'a str,
    pub no_cleanup: bool,
    pub migration_app: Option<PathBuf>,
    pub cf_binary: PathBuf,
}

pub async fn handle_migrate(
    conn_mgr: &ConnectionManager,
    profile: Option<&str>,
    args: MigrateArgs<'_>,
) -> Result<()> {
    let resolved = conn_mgr.resolve_profile(profile)?;
    let archive = resolved.migration_app(args.migration_app)?;
    debug!("Using migration app {}", archive.display());

    let request = MigrationRequest::new(args.source, args.plan)
        .with_product_name(resolved.profile.product_name())
        .with_cleanup(!args.no_cleanup);

    let migrator = Migrator::new(
        CfCliPlatform::new(args.cf_binary),
        TarballUnpacker::new(archive),
    )
    .with_progress(progress_printer(request.product_name.clone(), request.plan.clone()));

    migrator.run(&request).await?;
    Ok(())
}

/// Status lines go to stderr so stdout stays clean
fn progress_printer(product: String, plan: String) -> MigrationProgressCallback {
    Box::new(move |event| match event {
        MigrationEvent::Started { source, recipient } => {
            eprintln!(
                "{} The migrate command will not migrate any triggers, routines or events.",
                "Warning:".yellow().bold()
            );
            eprintln!(
                "Migrating {} to new service instance {} ({} {})",
                source.bold(),
                recipient.bold(),
                product,
                plan
            );
        }
        MigrationEvent::StepStarted(step) => eprintln!("{} {}...", "==>".cyan(), step),
        MigrationEvent::StepCompleted(_) => {}
        MigrationEvent::TaskLogs { app, logs } => {
            eprintln!("Recent logs of {}:", app);
            eprintln!("{}", logs);
        }
        MigrationEvent::CleanupAttempted { recipient } => {
            eprintln!("Cleaning up service instance {}...", recipient)
        }
        MigrationEvent::CleanupFailed { recipient, reason } => eprintln!(
            "{} could not delete service instance {}: {}",
            "Error:".red().bold(),
            recipient,
            reason
        ),
        MigrationEvent::Completed { source } => {
            eprintln!("{} {} has been migrated", "Done:".green().bold(), source)
        }
    })
}
