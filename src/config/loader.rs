//! Configuration loading and merging logic
//!
//! Handles loading configuration from multiple sources and merging them
//! according to precedence rules.

use super::{defaults, paths, schema::Config};
use anyhow::{Context, Result};
use std::path::Path;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with all layers merged
    ///
    /// Precedence order (highest to lowest):
    /// 1. Environment variable overrides
    /// 2. Root config file
    /// 3. Built-in defaults
    ///
    /// A missing config file is not an error; an unreadable or invalid one is.
    pub fn load() -> Result<Config> {
        let mut config = Self::load_defaults();

        let root_path = paths::root_config_path();
        if root_path.exists() {
            config = Self::load_file(&root_path)?;
        }

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a file
    ///
    /// Keys absent from the file take their built-in defaults.
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the config file and the merged result
    pub fn validate() -> Result<()> {
        let root_path = paths::root_config_path();
        if root_path.exists() {
            Self::load_file(&root_path)?
                .validate()
                .with_context(|| format!("Invalid config file: {}", root_path.display()))?;
        }

        Self::load()
            .context("Failed to load merged configuration")?
            .validate()
            .context("Invalid merged configuration")
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(namespace) = std::env::var("RANCHER_INSPECT_DEFAULT_NAMESPACE") {
            if !namespace.is_empty() {
                config.default_namespace = namespace;
            }
        }

        if let Ok(level) = std::env::var("RANCHER_INSPECT_LOG_LEVEL") {
            if !level.is_empty() {
                config.logger.level = level;
            }
        }

        if let Ok(insecure) = std::env::var("RANCHER_INSPECT_INSECURE") {
            if let Ok(val) = insecure.parse::<bool>() {
                config.insecure_skip_tls_verify = val;
            }
        }

        config
    }

    /// Save configuration to a file
    pub fn save(config: &Config, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }

        let yaml =
            serde_yaml::to_string(config).context("Failed to serialize configuration to YAML")?;

        std::fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Save root configuration
    pub fn save_root(config: &Config) -> Result<()> {
        Self::save(config, &paths::root_config_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.default_namespace, "fleet-default");
        assert_eq!(config.local_cluster, "local");
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config {
            default_namespace: "fleet-local".to_string(),
            event_limit: 3,
            ..Default::default()
        };
        ConfigLoader::save(&config, &path).unwrap();

        let loaded = ConfigLoader::load_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_file_rejects_bad_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "eventLimit: [not a number").unwrap();
        assert!(ConfigLoader::load_file(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: set_var is unsafe in Rust 2024 due to potential data races.
        // Only this test touches these variables.
        unsafe {
            std::env::set_var("RANCHER_INSPECT_DEFAULT_NAMESPACE", "fleet-local");
            std::env::set_var("RANCHER_INSPECT_INSECURE", "true");
        }

        let config = ConfigLoader::apply_env_overrides(Config::default());

        assert_eq!(config.default_namespace, "fleet-local");
        assert!(config.insecure_skip_tls_verify);

        // SAFETY: as above
        unsafe {
            std::env::remove_var("RANCHER_INSPECT_DEFAULT_NAMESPACE");
            std::env::remove_var("RANCHER_INSPECT_INSECURE");
        }
    }
}
