mod records;
mod show;

use clap::{Args, Parser, Subcommand};
use serde_json::{Map, Value};
use sheet_records::config::{Config, ListTarget};
use sheet_records::error::{AppError, ErrorReport, Result};
use sheet_records::mapper::RowMapper;
use sheet_records::sheets::SheetsClient;

pub use records::{AppendArgs, ReadArgs};
pub use show::ShowResource;

#[derive(Parser, Debug)]
#[command(name = "sheet-records")]
#[command(about = "Read and append spreadsheet rows as records, authenticated as a service account", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub async fn run(&self) -> Result<Value> {
        match &self.command {
            Commands::Append(args) => records::append(args).await,
            Commands::Read(args) => records::read(args).await,
            Commands::Show { resource } => resource.execute().await,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Append a JSON array of records as new rows
    Append(AppendArgs),
    /// Read rows as records or raw values
    Read(ReadArgs),
    Show {
        #[command(subcommand)]
        resource: ShowResource,
    },
}

/// Selects the spreadsheet and range, by config name or directly.
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// Project name from the config file
    #[arg(long)]
    project: Option<String>,
    /// List name within the project
    #[arg(long, requires = "project")]
    list: Option<String>,
    /// Spreadsheet ID, overriding the configured one
    #[arg(long)]
    spreadsheet_id: Option<String>,
    /// Range such as `Signups!A:Z`, overriding the configured one
    #[arg(long)]
    range: Option<String>,
}

impl TargetArgs {
    fn resolve(&self, config: &Config) -> Result<ListTarget> {
        let mut target = match (&self.project, &self.list) {
            (Some(project), Some(list)) => config.resolve(project, list)?,
            (Some(project), None) => ListTarget {
                spreadsheet_id: config.project(project)?.spreadsheet_id.clone(),
                range: String::new(),
            },
            _ => ListTarget::default(),
        };

        if let Some(spreadsheet_id) = &self.spreadsheet_id {
            target.spreadsheet_id = spreadsheet_id.clone();
        }
        if let Some(range) = &self.range {
            target.range = range.clone();
        }

        if target.spreadsheet_id.is_empty() || target.range.is_empty() {
            return Err(AppError::Validation(
                "specify --project and --list, or --spreadsheet-id and --range".to_string(),
            ));
        }

        Ok(target)
    }
}

fn build_mapper(config: &Config) -> Result<RowMapper<SheetsClient>> {
    let credential = config.credential()?;
    let sheets_client = SheetsClient::new(&config.google, credential)?;
    Ok(RowMapper::new(sheets_client))
}

/// Render a command result as the tagged JSON body printed on stdout.
pub fn render(result: &Result<Value>) -> Value {
    match result {
        Ok(Value::Object(fields)) => {
            let mut body = Map::new();
            body.insert("ok".to_string(), Value::Bool(true));
            body.extend(fields.clone());
            Value::Object(body)
        }
        Ok(other) => serde_json::json!({"ok": true, "data": other}),
        Err(e) => serde_json::to_value(ErrorReport::from(e))
            .unwrap_or_else(|_| serde_json::json!({"ok": false, "detail": e.to_string()})),
    }
}
