//! `find-bindings` command

use mysql_tools_core::discovery::{BindingFinder, BindingRecord};
use tracing::debug;

use crate::cli;
use crate::connection::ConnectionManager;
use crate::error::Result;
use crate::output::{self, OutputFormat};

const HEADERS: [&str; 6] = ["Name", "Service Instance", "Instance GUID", "Org", "Space", "Type"];

pub async fn handle_find_bindings(
    conn_mgr: &ConnectionManager,
    profile: Option<&str>,
    label: &str,
    output_format: cli::OutputFormat,
) -> Result<()> {
    let client = conn_mgr.create_catalog_client(profile)?;
    let records = BindingFinder::new(&client).find_bindings(label).await?;
    debug!("Found {} binding(s) for {}", records.len(), label);

    match OutputFormat::resolve(output_format, OutputFormat::Table) {
        OutputFormat::Table => println!("{}", records_table(&records)),
        fmt => output::print_output(&records, fmt)?,
    }
    Ok(())
}

fn records_table(records: &[BindingRecord]) -> comfy_table::Table {
    output::table(
        &HEADERS,
        records.iter().map(|r| {
            vec![
                r.name.clone(),
                r.service_instance_name.clone(),
                r.service_instance_guid.clone(),
                r.org_name.clone().unwrap_or_else(|| "-".to_string()),
                r.space_name.clone().unwrap_or_else(|| "-".to_string()),
                r.kind.to_string(),
            ]
        }),
    )
}
