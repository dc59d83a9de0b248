use anyhow::{Context, Result};
use autolink_core::Autolinked;
use std::io::Write;
use std::path::Path;
use tracing::{info, warn};

use crate::commands::load_service;
use crate::config::CliConfig;
use crate::vault::read_note;

/// Execute link subcommand
pub fn execute(config: CliConfig, file: &Path, output: Option<&Path>) -> Result<()> {
    let result = run(&config, file)?;

    match output {
        Some(path) => std::fs::write(path, &result.text)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(result.text.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

/// Autolink `file` against the configured vault
pub fn run(config: &CliConfig, file: &Path) -> Result<Autolinked> {
    let (service, files) = load_service(config)?;
    let body = read_note(file)?;

    let result = service
        .autolink_detailed(&body)
        .with_context(|| format!("Failed to autolink {}", file.display()))?;
    if result.truncated {
        warn!("Deadline hit, part of {} was left unlinked", file.display());
    }
    info!(
        "{}: {} links using the {} engine over {} notes",
        file.display(),
        result.links,
        service.engine_name(),
        files
    );
    Ok(result)
}
