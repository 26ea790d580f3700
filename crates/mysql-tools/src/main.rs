use anyhow::Result;
use clap::Parser;
use mysql_tools_core::Config;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;

use cli::{Cli, Commands};
use commands::migrate::MigrateArgs;
use connection::ConnectionManager;
use error::MysqlToolsError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Load configuration from specified path or default location
    let loaded = if let Some(config_file) = &cli.config_file {
        let path = std::path::PathBuf::from(config_file);
        debug!("Loading config from explicit path: {:?}", path);
        Config::load_from_path(&path).map(|config| (config, Some(path)))
    } else {
        debug!("Loading config from default location");
        Config::load().map(|config| (config, None))
    };
    let (config, config_path) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            MysqlToolsError::from(e).print_diagnostic();
            std::process::exit(1);
        }
    };
    let conn_mgr = ConnectionManager::with_config_path(config, config_path);

    if let Err(e) = execute_command(&cli, &conn_mgr).await {
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // RUST_LOG wins over the verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "mysql_tools=warn,mysql_tools_core=warn",
            1 => "mysql_tools=info,mysql_tools_core=info",
            2 => "mysql_tools=debug,mysql_tools_core=debug",
            _ => "mysql_tools=trace,mysql_tools_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), MysqlToolsError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => commands::version::handle_version(cli.output),

        Commands::FindBindings { label } => {
            commands::find_bindings::handle_find_bindings(
                conn_mgr,
                cli.profile.as_deref(),
                label,
                cli.output,
            )
            .await
        }

        Commands::Migrate {
            source,
            plan,
            no_cleanup,
            migration_app,
            cf_binary,
        } => {
            let args = MigrateArgs {
                source,
                plan,
                no_cleanup: *no_cleanup,
                migration_app: migration_app.clone(),
                cf_binary: cf_binary.clone(),
            };
            commands::migrate::handle_migrate(conn_mgr, cli.profile.as_deref(), args).await
        }

        Commands::Profile(profile_cmd) => {
            debug!("Executing profile command");
            commands::profile::handle_profile_command(profile_cmd, conn_mgr, cli.output).await
        }
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Command summary for logs, with credentials redacted
fn format_command(command: &Commands) -> String {
    match command {
        Commands::Version => "version".to_string(),
        Commands::FindBindings { label } => format!("find-bindings {}", label),
        Commands::Migrate {
            source,
            plan,
            no_cleanup,
            ..
        } => format!(
            "migrate {} {}{}",
            source,
            plan,
            if *no_cleanup { " --no-cleanup" } else { "" }
        ),
        Commands::Profile(cmd) => {
            use cli::ProfileCommands::*;
            match cmd {
                List => "profile list".to_string(),
                Path => "profile path".to_string(),
                Show { name } => format!("profile show {}", name),
                Set { name, .. } => format!("profile set {} [credentials redacted]", name),
                Remove { name, .. } => format!("profile remove {}", name),
                Default { name } => format!("profile default {}", name),
            }
        }
    }
}
