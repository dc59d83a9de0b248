use autolink_config::EngineKind;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Engine choice on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineArg {
    /// Parse notes into a document tree (default)
    Document,
    /// Line-by-line fallback
    Line,
}

impl From<EngineArg> for EngineKind {
    fn from(engine: EngineArg) -> Self {
        match engine {
            EngineArg::Document => EngineKind::Document,
            EngineArg::Line => EngineKind::Line,
        }
    }
}

#[derive(Parser)]
#[command(name = "autolink")]
#[command(about = "autolink - link notebook and note names across a Markdown vault")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Set log level (off, error, warn, info, debug, trace)
    /// If not specified, defaults to 'warn'
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path (defaults to ~/.config/autolink/config.toml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Vault directory (overrides config file and AUTOLINK_VAULT_PATH)
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,
}

impl Cli {
    /// Effective log level: explicit level, then --verbose, then warn
    pub fn level_filter(&self) -> LevelFilter {
        match (self.log_level, self.verbose) {
            (Some(level), _) => level.into(),
            (None, true) => LevelFilter::DEBUG,
            (None, false) => LevelFilter::WARN,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Autolink one note and print the result
    Link {
        /// Markdown file to process
        file: PathBuf,

        /// Autolinker implementation (overrides config file)
        #[arg(short, long, value_enum)]
        engine: Option<EngineArg>,

        /// Match names whose first letter differs in case
        #[arg(short = 'i', long)]
        case_insensitive: bool,

        /// Write the result here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print name index statistics for the vault
    Index {
        /// Also list every indexed word with its count
        #[arg(long)]
        words: bool,
    },

    /// List the entities a link target refers to
    Resolve {
        /// Entity name, entity key or autolink URL
        target: String,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}
