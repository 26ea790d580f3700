//! Error types for mysql-tools

use colored::Colorize;
use mysql_tools_core::catalog::CatalogError;
use mysql_tools_core::config::ConfigError;
use mysql_tools_core::discovery::DiscoveryError;
use mysql_tools_core::migrate::{CleanupOutcome, MigrationError};
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'lab' not found
///
///   tip: List available profiles: mysql-tools profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    tips: Vec<String>,
}

impl CliDiagnostic {
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            tips: Vec::new(),
        }
    }

    pub fn tip(mut self, description: &str) -> Self {
        self.tips.push(description.to_string());
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        for tip in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", tip);
        }
    }
}

/// Main error type for the mysql-tools application
#[derive(Error, Debug)]
pub enum MysqlToolsError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'mysql-tools profile set' to configure a profile.")]
    NoProfileConfigured,

    #[error("No migration app configured for profile '{profile}'")]
    MissingMigrationApp { profile: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("{0}")]
    Discovery(DiscoveryError),

    #[error("{0}")]
    Migration(#[from] MigrationError),

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for mysql-tools operations
pub type Result<T> = std::result::Result<T, MysqlToolsError>;

impl MysqlToolsError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            MysqlToolsError::ProfileNotFound { name } => vec![
                "List available profiles: mysql-tools profile list".to_string(),
                format!(
                    "Create profile '{}': mysql-tools profile set {} --api-url <url>",
                    name, name
                ),
            ],
            MysqlToolsError::NoProfileConfigured => vec![
                "Create a profile: mysql-tools profile set <name> --api-url <url> --access-token <token>".to_string(),
                "Or set CF_API_URL and CF_ACCESS_TOKEN".to_string(),
            ],
            MysqlToolsError::MissingMigrationApp { profile } => vec![
                "Pass the tarball with --migration-app <path>".to_string(),
                format!(
                    "Or store it in the profile: mysql-tools profile set {} --api-url <url> --migration-app <path>",
                    profile
                ),
            ],
            MysqlToolsError::AuthenticationFailed { .. } => vec![
                "Refresh the token: cf oauth-token".to_string(),
                "Check the profile: mysql-tools profile show <profile>".to_string(),
            ],
            MysqlToolsError::ConnectionError { message }
                if message.contains("certificate") || message.contains("SSL") =>
            {
                vec![
                    "For self-signed certificates set --skip-ssl-validation on the profile"
                        .to_string(),
                    "Check that the API URL is correct and reachable".to_string(),
                ]
            }
            MysqlToolsError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the API URL: mysql-tools profile show <profile>".to_string(),
            ],
            MysqlToolsError::Discovery(DiscoveryError::AmbiguousServiceClass { .. }) => vec![
                "Check the service offerings: cf marketplace".to_string(),
            ],
            MysqlToolsError::Migration(MigrationError::ServiceNotFound(_)) => vec![
                "List service instances in the targeted space: cf services".to_string(),
            ],
            MysqlToolsError::Migration(MigrationError::Aborted {
                recipient,
                cleanup: CleanupOutcome::Failed { .. },
                ..
            }) => vec![
                format!("Delete the leftover instance by hand: cf delete-service {recipient}"),
                "Rerun with -v to see each step".to_string(),
            ],
            MysqlToolsError::Migration(MigrationError::Aborted { .. }) => vec![
                "Rerun with -v to see each step".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion);
        }

        diag.print();
    }
}

impl From<CatalogError> for MysqlToolsError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Unauthorized { message } => {
                MysqlToolsError::AuthenticationFailed { message }
            }
            CatalogError::Connection(message) => MysqlToolsError::ConnectionError { message },
            CatalogError::InvalidUrl(message) => MysqlToolsError::Configuration(message),
            _ => MysqlToolsError::ApiError {
                message: err.to_string(),
            },
        }
    }
}

impl From<DiscoveryError> for MysqlToolsError {
    fn from(err: DiscoveryError) -> Self {
        // Auth and transport failures read better without the traversal context
        match err.catalog_error() {
            Some(source @ (CatalogError::Unauthorized { .. } | CatalogError::Connection(_))) => {
                MysqlToolsError::from(source.clone())
            }
            _ => MysqlToolsError::Discovery(err),
        }
    }
}

impl From<ConfigError> for MysqlToolsError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => MysqlToolsError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => MysqlToolsError::NoProfileConfigured,
            other => MysqlToolsError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for MysqlToolsError {
    fn from(err: serde_json::Error) -> Self {
        MysqlToolsError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<std::io::Error> for MysqlToolsError {
    fn from(err: std::io::Error) -> Self {
        MysqlToolsError::OutputError {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<anyhow::Error> for MysqlToolsError {
    fn from(err: anyhow::Error) -> Self {
        MysqlToolsError::OutputError {
            message: err.to_string(),
        }
    }
}
