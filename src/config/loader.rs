//! Configuration loading
//!
//! Resolution order: explicit `--config` path, then the platform config
//! directory, then the embedded defaults. A file that omits `views`
//! inherits the embedded bindings so the UI stays usable.

use super::schema::Config;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// The configuration compiled into the binary.
    pub const DEFAULT_CONFIG: &'static str = include_str!("default_config.yaml");

    /// Load configuration, falling back to embedded defaults.
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let resolved = match path {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_path().filter(|p| p.exists()),
        };

        let mut config = match resolved {
            Some(p) => Self::load_file(&p)?,
            None => Self::load_defaults(),
        };

        if config.views.is_empty() {
            config.views = Self::load_defaults().views;
        }

        Ok(Self::apply_env_overrides(config))
    }

    /// Load configuration from a specific file.
    pub fn load_file(path: &Path) -> Result<Config> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// The embedded default configuration.
    pub fn load_defaults() -> Config {
        serde_yaml::from_str(Self::DEFAULT_CONFIG).expect("embedded default config is valid")
    }

    /// Platform config file location (e.g. `~/.config/az9s/az9s.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "az9s")
            .map(|dirs| dirs.config_dir().join("az9s.yaml"))
    }

    /// Validate the effective configuration by loading it.
    pub fn validate(path: Option<&Path>) -> Result<()> {
        let config = Self::load(path)?;
        for view in &config.views {
            if view.view.is_empty() {
                anyhow::bail!("view record with an empty name");
            }
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    fn apply_env_overrides(mut config: Config) -> Config {
        if let Ok(ttl) = std::env::var("AZ9S_CACHE_TTL_SECONDS") {
            if let Ok(val) = ttl.parse::<u64>() {
                config.cache.ttl_seconds = val;
            }
        }

        if let Ok(buffer) = std::env::var("AZ9S_CONSOLE_BUFFER") {
            if let Ok(val) = buffer.parse::<usize>() {
                config.console.buffer = val;
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert_eq!(config.cache.ttl_seconds, 300);
        assert!(!config.views.is_empty());
        assert!(config.views.iter().any(|v| v.view == "SubscriptionListView"));
    }

    #[test]
    fn test_env_overrides() {
        // SAFETY: set_var is unsafe in Rust 2024 due to potential data races.
        // Safe in tests because each test sets its own isolated variables
        // and cleans up afterwards.
        unsafe {
            std::env::set_var("AZ9S_CACHE_TTL_SECONDS", "42");
        }

        let config = ConfigLoader::apply_env_overrides(Config::default());
        assert_eq!(config.cache.ttl_seconds, 42);

        // SAFETY: remove_var is unsafe in Rust 2024 for the same reasons.
        unsafe {
            std::env::remove_var("AZ9S_CACHE_TTL_SECONDS");
        }
    }
}
