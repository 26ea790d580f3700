//! Profile management command implementations

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use mysql_tools_core::config::{Config, Profile};
use serde_json::json;
use tracing::{debug, trace};

use crate::cli::{self, ProfileCommands};
use crate::connection::ConnectionManager;
use crate::error::{MysqlToolsError, Result};
use crate::output::{self, OutputFormat};

/// Handle profile management commands
pub async fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    output_format: cli::OutputFormat,
) -> Result<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set {
            name,
            api_url,
            access_token,
            skip_ssl_validation,
            recipient_product_name,
            migration_app,
        } => {
            let profile = Profile {
                api_url: api_url.clone(),
                access_token: access_token.clone(),
                skip_ssl_validation: *skip_ssl_validation,
                recipient_product_name: recipient_product_name.clone(),
                migration_app: migration_app.clone(),
            };
            handle_set(conn_mgr, name, profile)
        }
        Remove { name, yes } => handle_remove(conn_mgr, name, *yes),
        Default { name } => handle_default(conn_mgr, name),
    }
}

fn config_path(conn_mgr: &ConnectionManager) -> Result<PathBuf> {
    match &conn_mgr.config_path {
        Some(path) => Ok(path.clone()),
        None => Ok(Config::config_path()?),
    }
}

/// Profile summary without the token itself
fn profile_json(conn_mgr: &ConnectionManager, name: &str, profile: &Profile) -> serde_json::Value {
    json!({
        "name": name,
        "api_url": profile.api_url,
        "access_token_configured": profile.access_token.is_some(),
        "skip_ssl_validation": profile.skip_ssl_validation,
        "recipient_product_name": profile.product_name(),
        "migration_app": profile.migration_app.as_ref().map(|p| p.display().to_string()),
        "is_default": conn_mgr.config.default_profile.as_deref() == Some(name),
    })
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: cli::OutputFormat) -> Result<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());

    match OutputFormat::resolve(output_format, OutputFormat::Table) {
        OutputFormat::Table => {
            if profiles.is_empty() {
                println!("No profiles configured.");
                println!("Use 'mysql-tools profile set' to create a profile.");
                return Ok(());
            }
            let rows = profiles.iter().map(|(name, profile)| {
                let marker = if conn_mgr.config.default_profile.as_deref() == Some(name.as_str()) {
                    "*"
                } else {
                    ""
                };
                vec![
                    format!("{name}{marker}"),
                    profile.api_url.clone(),
                    profile.product_name().to_string(),
                ]
            });
            println!("{}", output::table(&["Name", "API URL", "Product"], rows));
        }
        fmt => {
            let list: Vec<_> = profiles
                .iter()
                .map(|(name, profile)| profile_json(conn_mgr, name, profile))
                .collect();
            output::print_output(json!({
                "config_path": config_path(conn_mgr)?.display().to_string(),
                "profiles": list,
            }), fmt)?;
        }
    }
    Ok(())
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: cli::OutputFormat) -> Result<()> {
    let path = config_path(conn_mgr)?;
    match output_format {
        cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
            let fmt = OutputFormat::resolve(output_format, OutputFormat::Json);
            output::print_output(json!({ "config_path": path.display().to_string() }), fmt)?;
        }
        _ => println!("{}", path.display()),
    }
    Ok(())
}

fn handle_show(
    conn_mgr: &ConnectionManager,
    name: &str,
    output_format: cli::OutputFormat,
) -> Result<()> {
    let profile = conn_mgr.config.profile(name)?;
    let summary = profile_json(conn_mgr, name, profile);

    match OutputFormat::resolve(output_format, OutputFormat::Table) {
        OutputFormat::Table => {
            println!("Profile: {}", name);
            println!("API URL: {}", profile.api_url);
            println!(
                "Access token: {}",
                if profile.access_token.is_some() {
                    "configured"
                } else {
                    "not set"
                }
            );
            println!("Skip SSL validation: {}", profile.skip_ssl_validation);
            println!("Recipient product: {}", profile.product_name());
            if let Some(app) = &profile.migration_app {
                println!("Migration app: {}", app.display());
            }
        }
        fmt => output::print_output(summary, fmt)?,
    }
    Ok(())
}

fn handle_set(conn_mgr: &ConnectionManager, name: &str, profile: Profile) -> Result<()> {
    debug!("Setting profile: {}", name);
    let mut config = conn_mgr.config.clone();
    let first = config.profiles.is_empty();
    config.set_profile(name.to_string(), profile);
    if first {
        config.default_profile = Some(name.to_string());
    }
    conn_mgr.save_config(&config)?;

    println!("Profile '{}' saved.", name);
    if first {
        println!("Set as default profile.");
    }
    Ok(())
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str, yes: bool) -> Result<()> {
    debug!("Removing profile: {}", name);
    conn_mgr.config.profile(name)?;

    if !yes && !confirm(&format!("Are you sure you want to remove profile '{}'? (y/N): ", name))? {
        println!("Profile removal cancelled.");
        return Ok(());
    }

    let mut config = conn_mgr.config.clone();
    let was_default = config.default_profile.as_deref() == Some(name);
    config.remove_profile(name);
    conn_mgr.save_config(&config)?;

    println!("Profile '{}' removed successfully.", name);
    if was_default {
        println!("Default profile cleared.");
    }
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> Result<()> {
    debug!("Setting default profile: {}", name);
    if !conn_mgr.config.profiles.contains_key(name) {
        return Err(MysqlToolsError::ProfileNotFound {
            name: name.to_string(),
        });
    }

    let mut config = conn_mgr.config.clone();
    config.default_profile = Some(name.to_string());
    conn_mgr.save_config(&config)?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}
