use anyhow::{Context, Result};
use autolink_core::{AutolinkService, Entity, EntityKind};
use colored::Colorize;

use crate::commands::load_service;
use crate::config::CliConfig;

/// Execute resolve subcommand
pub fn execute(config: CliConfig, target: &str, json: bool) -> Result<()> {
    let (service, _) = load_service(&config)?;
    let entities = find(&service, target);

    if json {
        let out =
            serde_json::to_string_pretty(&entities).context("Failed to serialize entities")?;
        println!("{}", out);
        return Ok(());
    }

    if entities.is_empty() {
        println!(
            "{} No entity answers to '{}'",
            "Not found:".yellow().bold(),
            target
        );
        return Ok(());
    }

    for entity in entities {
        let kind = match entity.kind {
            EntityKind::Notebook => "notebook".blue(),
            EntityKind::Note => "note".green(),
            EntityKind::Tag => "tag".magenta(),
        };
        let name = match entity.abbreviation() {
            Some(abbr) => format!("{} ({})", entity.name, abbr),
            None => entity.name.clone(),
        };
        println!("{:>8}  {}  {}", kind, name, entity.key.dimmed());
    }
    Ok(())
}

/// Entities a link URL, key or bare name refers to
pub fn find<'a>(service: &'a AutolinkService, target: &str) -> Vec<&'a Entity> {
    match service.resolve_link(target) {
        Ok(entities) if !entities.is_empty() => entities,
        _ => service.catalog().resolve(target),
    }
}
