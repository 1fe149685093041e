use super::build_mapper;
use clap::Subcommand;
use serde_json::{Value, json};
use sheet_records::config::Config;
use sheet_records::error::{AppError, Result};
use sheet_records::sheets::SheetOperations;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ShowResource {
    /// Show the configuration file path
    Paths,
    /// Show the title and tabs of a spreadsheet
    Metadata {
        /// Project name from the config file
        #[arg(long, required_unless_present = "spreadsheet_id")]
        project: Option<String>,
        /// Spreadsheet ID, overriding the project's
        #[arg(long)]
        spreadsheet_id: Option<String>,
    },
}

impl ShowResource {
    pub async fn execute(&self) -> Result<Value> {
        match self {
            ShowResource::Paths => show_paths(),
            ShowResource::Metadata {
                project,
                spreadsheet_id,
            } => show_metadata(project.as_deref(), spreadsheet_id.as_deref()).await,
        }
    }
}

fn show_paths() -> Result<Value> {
    let config_path = Config::config_file()?;

    info!(path = ?config_path, "Config path");

    Ok(json!({ "config_file": config_path }))
}

async fn show_metadata(project: Option<&str>, spreadsheet_id: Option<&str>) -> Result<Value> {
    let config = Config::load()?;
    let spreadsheet_id = match (spreadsheet_id, project) {
        (Some(id), _) => id.to_string(),
        (None, Some(project)) => config.project(project)?.spreadsheet_id.clone(),
        (None, None) => {
            return Err(AppError::Validation(
                "specify --project or --spreadsheet-id".to_string(),
            ));
        }
    };

    let mapper = build_mapper(&config)?;
    let metadata = mapper.sheets_client().get_metadata(&spreadsheet_id).await?;

    Ok(serde_json::to_value(metadata)?)
}
