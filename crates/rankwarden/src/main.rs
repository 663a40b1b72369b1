//! Rankwarden CLI binary.
//!
//! This binary provides command-line access to the rank store:
//! - Check connectivity and create the rank table
//! - Read and write the rank of one identity
//! - List the rank table

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenvy::dotenv().ok();

    let cli = cli::Cli::parse();
    rankwarden::init_tracing(cli.verbose)?;

    cli::execute(cli).await?;
    Ok(())
}
