//! CLI structure and command definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Find service bindings and migrate MySQL service instances
#[derive(Parser, Debug)]
#[command(name = "mysql-tools")]
#[command(version, about = "Find service bindings and migrate MySQL service instances")]
#[command(long_about = "
Find service bindings and migrate MySQL service instances

Discovery talks to the catalog API configured in your profile; migration
drives the `cf` CLI, which must be logged in and targeted.

EXAMPLES:
    # Set up a profile
    mysql-tools profile set lab --api-url https://api.sys.example.com --access-token \"$(cf oauth-token)\"

    # List every app binding and service key of p.mysql instances
    mysql-tools find-bindings p.mysql

    # JSON output for scripting
    mysql-tools find-bindings p.mysql -o json

    # Migrate an instance onto a new db-small instance
    mysql-tools migrate my-db db-small

For more help on a specific command, run:
    mysql-tools <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "MYSQL_TOOLS_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "MYSQL_TOOLS_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Automatically choose format based on command and context
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Human-readable table format
    Table,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List app bindings and service keys of every instance of a service
    #[command(visible_alias = "fb")]
    #[command(after_help = "EXAMPLES:
    mysql-tools find-bindings p.mysql
    mysql-tools find-bindings p.mysql -o json
    mysql-tools find-bindings p-mysql --profile legacy
")]
    FindBindings {
        /// Service label, e.g. p.mysql
        label: String,
    },

    /// Migrate a service instance onto a newly created instance
    #[command(after_help = "The new instance is created as <source>-new. Once the data is copied the
source is renamed to <source>-old and the new instance takes over its name.
Triggers, routines and events are not migrated.

EXAMPLES:
    mysql-tools migrate my-db db-small
    mysql-tools migrate my-db db-small --no-cleanup
")]
    Migrate {
        /// Name of the service instance to migrate
        #[arg(value_name = "SOURCE_SERVICE_INSTANCE")]
        source: String,

        /// Plan for the new service instance
        #[arg(value_name = "PLAN_TYPE")]
        plan: String,

        /// Keep the new service instance after a failed migration
        #[arg(long)]
        no_cleanup: bool,

        /// Migration app tarball (overrides the profile setting)
        #[arg(long, env = "MYSQL_TOOLS_MIGRATION_APP")]
        migration_app: Option<PathBuf>,

        /// Path to the cf CLI
        #[arg(long, default_value = "cf")]
        cf_binary: PathBuf,
    },

    /// Profile management
    #[command(subcommand, visible_alias = "prof")]
    #[command(after_help = "EXAMPLES:
    # Create a profile
    mysql-tools profile set lab --api-url https://api.sys.example.com --access-token '${CF_TOKEN}'

    # List all profiles
    mysql-tools profile list

    # Set the default profile
    mysql-tools profile default lab
")]
    Profile(ProfileCommands),

    /// Version information
    #[command(visible_alias = "ver")]
    Version,
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add")]
    Set {
        /// Profile name
        name: String,

        /// Base URL of the catalog API
        #[arg(long)]
        api_url: String,

        /// OAuth access token; may reference an environment variable as ${VAR}
        #[arg(long)]
        access_token: Option<String>,

        /// Skip TLS certificate validation
        #[arg(long)]
        skip_ssl_validation: bool,

        /// Product used for instances created by `migrate`
        #[arg(long)]
        recipient_product_name: Option<String>,

        /// Migration app tarball used by `migrate`
        #[arg(long)]
        migration_app: Option<PathBuf>,
    },

    /// Remove a profile
    #[command(visible_alias = "rm")]
    Remove {
        /// Profile name to remove
        name: String,

        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Set the default profile
    Default {
        /// Profile name to use by default
        name: String,
    },
}
