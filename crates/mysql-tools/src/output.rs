use anyhow::Result;
use comfy_table::Table;
use serde::Serialize;
use serde_json::Value;

use crate::cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

impl OutputFormat {
    /// Map the CLI flag, using `auto_default` for `-o auto`
    pub fn resolve(format: cli::OutputFormat, auto_default: OutputFormat) -> Self {
        match format {
            cli::OutputFormat::Auto => auto_default,
            cli::OutputFormat::Json => OutputFormat::Json,
            cli::OutputFormat::Yaml => OutputFormat::Yaml,
            cli::OutputFormat::Table => OutputFormat::Table,
        }
    }
}

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    let json_value = serde_json::to_value(data)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json_value)?);
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(&json_value)?);
        }
        OutputFormat::Table => {
            println!("{}", value_table(&json_value));
        }
    }

    Ok(())
}

/// Render rows under fixed headers
pub fn table<H, R>(headers: &[H], rows: R) -> Table
where
    H: AsRef<str>,
    R: IntoIterator<Item = Vec<String>>,
{
    let mut table = Table::new();
    table.set_header(headers.iter().map(AsRef::as_ref).collect::<Vec<_>>());
    for row in rows {
        table.add_row(row);
    }
    table
}

fn value_table(value: &Value) -> String {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            // Headers from the first object
            if let Value::Object(first) = &arr[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                let rows = arr.iter().filter_map(|item| match item {
                    Value::Object(obj) => Some(
                        headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect(),
                    ),
                    _ => None,
                });
                table(&headers, rows).to_string()
            } else {
                table(&["Value"], arr.iter().map(|item| vec![format_value(item)])).to_string()
            }
        }
        Value::Object(obj) => table(
            &["Key", "Value"],
            obj.iter().map(|(key, val)| vec![key.clone(), format_value(val)]),
        )
        .to_string(),
        _ => format_value(value),
    }
}

pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
