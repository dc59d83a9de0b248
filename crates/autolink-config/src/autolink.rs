//! Autolinking component configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{ConfigError, ConfigResult};

/// Names that must never become links, so protocol prefixes of bare URLs
/// are not mistaken for entity names.
pub const DEFAULT_DENYLIST: &[&str] = &["http", "https"];

/// Default scheme and host prefixed to entity names in injected link URLs.
pub const DEFAULT_LINK_PREFIX: &str = "autolink://entity/";

/// Which autolinker implementation rewrites note bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Parse the body into a document tree and link plain text in paragraphs
    #[default]
    Document,
    /// Line-by-line fallback with regex protection of links, code and math
    Line,
}

impl EngineKind {
    /// Stable lowercase name, as used in config files and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            EngineKind::Document => "document",
            EngineKind::Line => "line",
        }
    }
}

/// Configuration for the autolinking engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutolinkConfig {
    /// Master switch. When off, note bodies are returned verbatim.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Also match when the first character of a word differs only in case.
    #[serde(default)]
    pub case_insensitive: bool,

    /// Autolinker implementation.
    #[serde(default)]
    pub engine: EngineKind,

    /// Names that are never linked, even if an entity carries them.
    ///
    /// Default: ["http", "https"]
    #[serde(default = "default_denylist")]
    pub denylist: Vec<String>,

    /// URL prefix of document-path links; the entity name is appended verbatim.
    #[serde(default = "default_link_prefix")]
    pub link_prefix: String,

    /// Soft deadline of one autolinking pass in milliseconds (0 = no deadline).
    #[serde(default = "default_deadline_ms")]
    pub deadline_ms: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_denylist() -> Vec<String> {
    DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect()
}

fn default_link_prefix() -> String {
    DEFAULT_LINK_PREFIX.to_string()
}

fn default_deadline_ms() -> u64 {
    1000
}

impl Default for AutolinkConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            case_insensitive: false,
            engine: EngineKind::default(),
            denylist: default_denylist(),
            link_prefix: default_link_prefix(),
            deadline_ms: default_deadline_ms(),
        }
    }
}

impl AutolinkConfig {
    /// Check values that parse fine but cannot produce valid links
    pub fn validate(&self) -> ConfigResult<()> {
        if self.link_prefix.is_empty() {
            return Err(ConfigError::invalid("link_prefix must not be empty"));
        }
        if self.link_prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::invalid(format!(
                "link_prefix must not contain whitespace: {:?}",
                self.link_prefix
            )));
        }
        Ok(())
    }

    /// Soft deadline of a single pass, `None` when disabled
    pub fn deadline(&self) -> Option<Duration> {
        match self.deadline_ms {
            0 => None,
            ms => Some(Duration::from_millis(ms)),
        }
    }

    /// Whether `name` is on the denylist
    pub fn is_denied(&self, name: &str) -> bool {
        self.denylist.iter().any(|denied| denied == name)
    }
}
