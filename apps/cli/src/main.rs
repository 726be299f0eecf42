//! SermonDeck CLI — curated-insight generation for a sermon library.
//!
//! Enriches a bounded selection of documents with AI-generated insights and
//! categories, with deterministic local fallbacks when the model service is
//! unavailable.

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
