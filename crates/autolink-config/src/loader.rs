//! Loading configuration from TOML

use std::fs;
use std::path::Path;
use tracing::debug;

use crate::autolink::AutolinkConfig;
use crate::error::{ConfigError, ConfigResult};

impl AutolinkConfig {
    /// Parse and validate configuration from a TOML string
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        let config: AutolinkConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// A missing file is not an error: defaults are returned instead.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("No autolink config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        debug!("Loaded autolink config from {}", path.display());
        Ok(config)
    }

    /// Render the configuration as pretty TOML
    pub fn to_toml_string(&self) -> String {
        // Every field is a plain scalar or a list of strings
        toml::to_string_pretty(self).unwrap_or_default()
    }
}
