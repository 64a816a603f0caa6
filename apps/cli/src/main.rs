//! stylebuild CLI: compiles the site stylesheet.
//!
//! Reads the source stylesheet, expands utility classes found in the content
//! files, post-processes the result and writes it to the output path.

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
