mod cli;
mod commands;
mod config;
mod logging;
mod render;

use clap::Parser;
use log::LevelFilter;

use crate::cli::Cli;
use crate::commands::App;
use crate::config::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log, level);

    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_overrides(&cli);
    App::new(config).execute(cli.command).await
}
