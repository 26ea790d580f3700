//! Profile resolution and client construction

use std::path::PathBuf;

use anyhow::Context;
use mysql_tools_core::catalog::HttpCatalogClient;
use mysql_tools_core::config::{Config, Profile};
use tracing::{debug, info, trace};

use crate::error::{MysqlToolsError, Result as CliResult};

/// User agent string for mysql-tools HTTP requests
const MYSQL_TOOLS_USER_AGENT: &str = concat!("mysql-tools/", env!("CARGO_PKG_VERSION"));

/// Connection manager for creating authenticated clients
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

/// Profile after environment overrides
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile {
    /// `None` when no profiles are configured
    pub name: Option<String>,
    pub profile: Profile,
}

impl ResolvedProfile {
    fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("environment")
    }

    /// Migration app tarball from the flag, falling back to the profile
    pub fn migration_app(&self, explicit: Option<PathBuf>) -> CliResult<PathBuf> {
        explicit
            .or_else(|| self.profile.migration_app.clone())
            .ok_or_else(|| MysqlToolsError::MissingMigrationApp {
                profile: self.label().to_string(),
            })
    }
}

impl ConnectionManager {
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self, config: &Config) -> CliResult<()> {
        if let Some(ref path) = self.config_path {
            config
                .save_to_path(path)
                .context("Failed to save configuration")?;
        } else {
            config.save().context("Failed to save configuration")?;
        }
        Ok(())
    }

    /// Resolve the profile, layering `CF_API_URL`, `CF_ACCESS_TOKEN` and
    /// `RECIPIENT_PRODUCT_NAME` on top
    ///
    /// When --config-file is explicitly specified, environment variables are
    /// ignored so the file alone decides.
    pub fn resolve_profile(&self, profile_name: Option<&str>) -> CliResult<ResolvedProfile> {
        let use_env_vars = self.config_path.is_none();
        debug!(
            "Config path: {:?}, use_env_vars: {}",
            self.config_path, use_env_vars
        );
        if !use_env_vars {
            info!("--config-file specified explicitly, ignoring environment variables");
        }

        let env = |name: &str| {
            if use_env_vars {
                std::env::var(name).ok().filter(|v| !v.is_empty())
            } else {
                None
            }
        };
        let env_api_url = env("CF_API_URL");
        let env_access_token = env("CF_ACCESS_TOKEN");
        let env_product_name = env("RECIPIENT_PRODUCT_NAME");

        let mut resolved = if profile_name.is_none() && self.config.profiles.is_empty() {
            // The environment may supply everything; the api_url check is left
            // to the commands that need one
            debug!("No profiles configured, using environment only");
            ResolvedProfile {
                name: None,
                profile: Profile::new(""),
            }
        } else {
            let name = self.config.resolve_profile(profile_name)?;
            info!("Using profile: {}", name);
            let profile = self.config.profile(&name)?.clone();
            ResolvedProfile {
                name: Some(name),
                profile,
            }
        };

        if let Some(url) = env_api_url {
            debug!("Found CF_API_URL environment variable");
            resolved.profile.api_url = url;
        }
        if let Some(token) = env_access_token {
            debug!("Found CF_ACCESS_TOKEN environment variable");
            resolved.profile.access_token = Some(token);
        }
        if let Some(product) = env_product_name {
            debug!("Found RECIPIENT_PRODUCT_NAME environment variable");
            resolved.profile.recipient_product_name = Some(product);
        }

        trace!("Resolved profile: {:?}", resolved.name);
        Ok(resolved)
    }

    /// Create a catalog client for the resolved profile
    pub fn create_catalog_client(&self, profile_name: Option<&str>) -> CliResult<HttpCatalogClient> {
        let resolved = self.resolve_profile(profile_name)?;
        if resolved.profile.api_url.is_empty() {
            return Err(MysqlToolsError::NoProfileConfigured);
        }
        debug!(
            "Creating catalog client for {} at {}",
            resolved.label(),
            resolved.profile.api_url
        );

        let mut builder = HttpCatalogClient::builder()
            .base_url(&resolved.profile.api_url)
            .user_agent(MYSQL_TOOLS_USER_AGENT)
            .skip_ssl_validation(resolved.profile.skip_ssl_validation);
        if let Some(token) = &resolved.profile.access_token {
            builder = builder.access_token(token);
        }

        Ok(builder.build()?)
    }
}
