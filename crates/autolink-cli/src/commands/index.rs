use anyhow::Result;
use colored::Colorize;

use crate::commands::load_service;
use crate::config::CliConfig;

/// Execute index subcommand
pub fn execute(config: CliConfig, words: bool) -> Result<()> {
    let (service, files) = load_service(&config)?;
    let stats = service.stats();

    println!("{}\n", "Name Index".bold());
    println!("  {:<16} {}", "Notes scanned:".cyan(), files);
    println!("  {:<16} {}", "Entities:".cyan(), stats.entities);
    println!("  {:<16} {}", "Linkable:".cyan(), stats.linkable);
    println!("  {:<16} {}", "Indexed words:".cyan(), stats.indexed_words);
    println!("  {:<16} {}", "Candidates:".cyan(), stats.candidates);
    println!("  {:<16} {}", "Engine:".cyan(), service.engine_name());
    println!("\nVault: {}", config.vault.path.display());

    if words {
        println!();
        for (word, count) in service.index().words() {
            if count > 1 {
                println!("  {} {}", word, format!("x{}", count).dimmed());
            } else {
                println!("  {}", word);
            }
        }
    }
    Ok(())
}
