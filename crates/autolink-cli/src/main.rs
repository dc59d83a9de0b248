use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use autolink_cli::{
    cli::{Cli, Commands},
    commands,
    config::{CliConfig, CliOverrides},
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so linked output on stdout stays clean
    let level = cli.level_filter();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::new(format!(
            "autolink_cli={},autolink_core={}",
            level, level
        )))
        .init();

    let mut overrides = CliOverrides {
        vault_path: cli.vault,
        ..Default::default()
    };
    if let Commands::Link {
        engine,
        case_insensitive,
        ..
    } = &cli.command
    {
        overrides.engine = engine.map(Into::into);
        overrides.case_insensitive = *case_insensitive;
    }
    let config = CliConfig::load(cli.config, overrides)?;

    match cli.command {
        Commands::Link { file, output, .. } => {
            commands::link::execute(config, &file, output.as_deref())?
        }
        Commands::Index { words } => commands::index::execute(config, words)?,
        Commands::Resolve { target, json } => {
            commands::resolve::execute(config, &target, json)?
        }
        Commands::Config => commands::config::execute(config)?,
    }

    Ok(())
}
