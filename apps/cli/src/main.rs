//! ScholarStack CLI: accumulate Google Scholar result cards into a single
//! growing HTML document, highlight terms in it, and prune selections.

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
