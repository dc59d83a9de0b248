pub mod config;
pub mod index;
pub mod link;
pub mod resolve;

use anyhow::{Context, Result};
use autolink_core::AutolinkService;

use crate::config::CliConfig;
use crate::vault::Vault;

/// Scan the configured vault and index its entities
pub fn load_service(config: &CliConfig) -> Result<(AutolinkService, usize)> {
    let vault = Vault::load(&config.vault.path)
        .with_context(|| format!("Failed to scan vault {}", config.vault.path.display()))?;
    let files = vault.file_count();

    let mut service = AutolinkService::new(config.autolink.clone())
        .context("Failed to create autolink service")?;
    service.rebuild(vault.into_entities());
    Ok((service, files))
}
