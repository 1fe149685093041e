use super::{TargetArgs, build_mapper};
use clap::Args;
use serde_json::Value;
use sheet_records::config::Config;
use sheet_records::error::Result;
use sheet_records::mapper::ReadFormat;
use sheet_records::models::{RangeSpec, Record};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Debug)]
pub struct AppendArgs {
    #[command(flatten)]
    target: TargetArgs,
    /// JSON file holding an array of records; read from stdin when omitted
    #[arg(long)]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    target: TargetArgs,
    #[arg(long, value_enum, default_value_t = ReadFormat::Objects)]
    format: ReadFormat,
}

pub(super) async fn append(args: &AppendArgs) -> Result<Value> {
    let config = Config::load()?;
    let target = args.target.resolve(&config)?;
    let range: RangeSpec = target.range.parse()?;

    let payload = match &args.file {
        Some(path) => fs::read_to_string(path)?,
        None => io::read_to_string(io::stdin())?,
    };
    let records = Record::batch_from_json(serde_json::from_str(&payload)?)?;
    debug!(records = records.len(), "Parsed records");

    let mapper = build_mapper(&config)?;
    let outcome = mapper
        .append_records(&target.spreadsheet_id, &range, &records)
        .await?;

    Ok(serde_json::to_value(outcome)?)
}

pub(super) async fn read(args: &ReadArgs) -> Result<Value> {
    let config = Config::load()?;
    let target = args.target.resolve(&config)?;
    let range: RangeSpec = target.range.parse()?;

    let mapper = build_mapper(&config)?;
    let outcome = mapper
        .read_records(&target.spreadsheet_id, &range, args.format)
        .await?;

    Ok(serde_json::to_value(outcome)?)
}
