use crate::cli::{Cli, Commands};
use clap::Parser;
use lifcore::core::config::CoreConfig;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod gui;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(cli.log_filter(env.as_deref()))
        .with_target(false)
        .init();

    let config = CoreConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Run(args) => commands::run::run(&config, &args)?,
        Commands::Load(args) => commands::load::run(&config, &args)?,
        Commands::Trace(args) => commands::trace::run(&config, &args)?,
        Commands::Gui => commands::gui::run(config)?,
    }

    Ok(())
}
