//! gitty: streaming commit graph viewer
//!
//! This binary crate prints the lane layout of a repository's history, one
//! row per commit, as text or JSON lines.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use gitty::app;
use gitty::config::Config;

fn main() -> Result<()> {
    let config = Config::parse();

    // Rows go to stdout; logs stay on stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_level().into()))
        .with_writer(std::io::stderr)
        .init();

    config.validate()?;
    app::run(&config)
}
