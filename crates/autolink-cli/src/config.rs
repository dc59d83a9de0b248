use anyhow::{Context, Result};
use autolink_config::{AutolinkConfig, EngineKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Vault configuration
    #[serde(default)]
    pub vault: VaultConfig,
    /// Autolinking engine configuration
    #[serde(default)]
    pub autolink: AutolinkConfig,
}

/// Vault configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Path to the vault directory
    #[serde(default = "default_vault_path")]
    pub path: PathBuf,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            path: default_vault_path(),
        }
    }
}

fn default_vault_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// Command line values that override the configuration
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub vault_path: Option<PathBuf>,
    pub engine: Option<EngineKind>,
    pub case_insensitive: bool,
}

impl CliConfig {
    /// Load configuration with precedence: defaults < file < env < args
    pub fn load(config_file: Option<PathBuf>, overrides: CliOverrides) -> Result<Self> {
        let mut config = Self::from_file_or_default(config_file)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);

        config
            .autolink
            .validate()
            .context("Invalid autolink configuration")?;
        Ok(config)
    }

    /// Apply AUTOLINK_* environment variables read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("AUTOLINK_VAULT_PATH") {
            self.vault.path = PathBuf::from(path);
        }
        if let Some(flag) = lookup("AUTOLINK_CASE_INSENSITIVE") {
            self.autolink.case_insensitive = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
    }

    /// Apply command line arguments (highest priority)
    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(path) = overrides.vault_path {
            self.vault.path = path;
        }
        if let Some(engine) = overrides.engine {
            self.autolink.engine = engine;
        }
        if overrides.case_insensitive {
            self.autolink.case_insensitive = true;
        }
    }

    /// Get default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("autolink");
        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file or return default
    fn from_file_or_default(config_file: Option<PathBuf>) -> Result<Self> {
        // Test runs never pick up the user's config
        if std::env::var("AUTOLINK_TEST_MODE").is_ok() && config_file.is_none() {
            return Ok(Self::default());
        }

        let path = config_file
            .or_else(|| Self::default_config_path().ok())
            .filter(|p| p.exists());

        match path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Display the current configuration as TOML
    pub fn display_as_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config as TOML")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert!(config.autolink.enabled);
        assert_eq!(config.autolink.engine, EngineKind::Document);
    }

    #[test]
    fn test_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(
            &path,
            "[vault]\npath = \"/srv/notes\"\n\n[autolink]\nengine = \"line\"\n",
        )
        .unwrap();

        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.vault.path, PathBuf::from("/srv/notes"));
        assert_eq!(config.autolink.engine, EngineKind::Line);
        assert_eq!(config.autolink.denylist, vec!["http", "https"]);
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[autolink]\nengine = 3\n").unwrap();

        let err = CliConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_explicit_file_with_overrides() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[autolink]\nengine = \"line\"\n").unwrap();
        let vault = temp.path().join("vault");

        let config = CliConfig::load(
            Some(path),
            CliOverrides {
                vault_path: Some(vault.clone()),
                engine: Some(EngineKind::Document),
                case_insensitive: true,
            },
        )
        .unwrap();

        assert_eq!(config.vault.path, vault);
        assert_eq!(config.autolink.engine, EngineKind::Document);
        assert!(config.autolink.case_insensitive);
    }

    #[test]
    fn test_load_rejects_invalid_prefix() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[autolink]\nlink_prefix = \"has space\"\n").unwrap();

        assert!(CliConfig::load(Some(path), CliOverrides::default()).is_err());
    }

    #[test]
    fn test_env_layer() {
        let mut config = CliConfig::default();
        config.apply_env(env(&[
            ("AUTOLINK_VAULT_PATH", "/env/vault"),
            ("AUTOLINK_CASE_INSENSITIVE", "true"),
        ]));
        assert_eq!(config.vault.path, PathBuf::from("/env/vault"));
        assert!(config.autolink.case_insensitive);

        config.apply_env(env(&[("AUTOLINK_CASE_INSENSITIVE", "0")]));
        assert!(!config.autolink.case_insensitive);
    }

    #[test]
    fn test_args_beat_env() {
        let mut config = CliConfig::default();
        config.apply_env(env(&[("AUTOLINK_VAULT_PATH", "/env/vault")]));
        config.apply_overrides(CliOverrides {
            vault_path: Some(PathBuf::from("/arg/vault")),
            ..Default::default()
        });
        assert_eq!(config.vault.path, PathBuf::from("/arg/vault"));
    }

    #[test]
    fn test_display_as_toml() {
        let config = CliConfig::default();
        let toml = config.display_as_toml().unwrap();
        assert!(toml.contains("[autolink]"));
        assert!(toml.contains("link_prefix"));
    }
}
