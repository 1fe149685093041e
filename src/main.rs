mod cli;

use clap::Parser;

use crate::cli::Cli;
use tracing::error;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    // Logs go to stderr, stdout carries the JSON result
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = cli.run().await;
    println!("{}", cli::render(&result));

    if let Err(e) = result {
        error!("Error: {}", e);
        std::process::exit(1);
    }
}
