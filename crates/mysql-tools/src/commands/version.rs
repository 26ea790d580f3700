//! `version` command

use serde_json::json;

use crate::cli;
use crate::error::Result;
use crate::output::{self, OutputFormat};

/// Commit the binary was built from, when the build provides it
const GIT_SHA: &str = match option_env!("MYSQL_TOOLS_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

pub fn handle_version(output_format: cli::OutputFormat) -> Result<()> {
    match output_format {
        cli::OutputFormat::Json | cli::OutputFormat::Yaml => {
            let fmt = OutputFormat::resolve(output_format, OutputFormat::Json);
            output::print_output(
                json!({
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                    "git_sha": GIT_SHA,
                }),
                fmt,
            )?;
        }
        _ => println!("{} ({})", env!("CARGO_PKG_VERSION"), GIT_SHA),
    }
    Ok(())
}
