use anyhow::Result;

use crate::config::CliConfig;

/// Execute config subcommand
pub fn execute(config: CliConfig) -> Result<()> {
    println!("{}", config.display_as_toml()?);
    Ok(())
}
