//! The `tinyc` command-line tool.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use cli::Cli;
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> anyhow::Result<()> {
    better_panic::install();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli: Cli = argh::from_env();
    cli.handle()
}
