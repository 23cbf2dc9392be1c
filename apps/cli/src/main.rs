//! doclib CLI: documentation library builder.
//!
//! Ingests a Markdown/MDX docs tree into a categorized reference library,
//! searches the result by keyword, and runs AI video analysis against the
//! analysis service.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
