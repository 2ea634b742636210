//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Resource cache configuration
    #[serde(default)]
    pub cache: CacheConfig,

    /// Serial console configuration
    #[serde(default)]
    pub console: ConsoleConfig,

    /// View → action bindings, in display order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<ViewConfig>,
}

/// Resource cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfig {
    /// Default TTL for cached collections, in seconds
    #[serde(default = "default_cache_ttl_seconds")]
    pub ttl_seconds: u64,

    /// Interval between expired-entry sweeps, in seconds
    #[serde(default = "default_sweep_interval_seconds")]
    pub sweep_interval_seconds: u64,
}

impl CacheConfig {
    /// Effective TTL; a non-positive configured value falls back to the default.
    pub fn ttl(&self) -> Duration {
        if self.ttl_seconds == 0 {
            Duration::from_secs(default_cache_ttl_seconds())
        } else {
            Duration::from_secs(self.ttl_seconds)
        }
    }

    /// Effective sweep interval; a non-positive value falls back to the default.
    pub fn sweep_interval(&self) -> Duration {
        if self.sweep_interval_seconds == 0 {
            Duration::from_secs(default_sweep_interval_seconds())
        } else {
            Duration::from_secs(self.sweep_interval_seconds)
        }
    }
}

/// Serial console configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsoleConfig {
    /// Max console lines kept in the scrollback buffer
    #[serde(default = "default_console_buffer")]
    pub buffer: usize,
}

/// Actions configured for one view kind
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ViewConfig {
    /// The view kind these actions apply to
    pub view: String,

    #[serde(default)]
    pub actions: Vec<ActionConfig>,
}

/// One trigger → operation binding, as written in the config file
///
/// Required fields are optional here so that a malformed row can be
/// skipped with a log entry instead of failing the whole file; validation
/// happens when the action registry is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ActionConfig {
    /// Trigger key: a named key ("Enter", "F1") or a single character
    #[serde(default)]
    pub key: Option<String>,

    /// Operation name resolved by the view's own operation table
    #[serde(default)]
    pub action: Option<String>,

    /// Whether the spawned view receives input focus
    #[serde(default)]
    pub take_focus: bool,

    /// Pane width weight for the spawned view
    #[serde(default)]
    pub width: Option<u16>,

    /// Human-readable label for the action bar
    #[serde(default)]
    pub description: String,
}

// Default value functions
fn default_cache_ttl_seconds() -> u64 {
    300
}

fn default_sweep_interval_seconds() -> u64 {
    60
}

fn default_console_buffer() -> usize {
    5000
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_cache_ttl_seconds(),
            sweep_interval_seconds: default_sweep_interval_seconds(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            buffer: default_console_buffer(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.cache.ttl(), Duration::from_secs(300));
        assert_eq!(config.cache.sweep_interval(), Duration::from_secs(60));
        assert_eq!(config.console.buffer, 5000);
        assert!(config.views.is_empty());
    }

    #[test]
    fn test_zero_ttl_falls_back_to_default() {
        let config = CacheConfig {
            ttl_seconds: 0,
            sweep_interval_seconds: 0,
        };
        assert_eq!(config.ttl(), Duration::from_secs(300));
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
cache:
  ttlSeconds: 120
views:
  - view: SubscriptionListView
    actions:
      - key: Enter
        action: SpawnResourceGroupListView
        takeFocus: true
        width: 2
        description: Select
      - action: MissingKeyRow
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cache.ttl_seconds, 120);
        assert_eq!(config.views.len(), 1);

        let actions = &config.views[0].actions;
        assert_eq!(actions[0].key.as_deref(), Some("Enter"));
        assert!(actions[0].take_focus);
        assert_eq!(actions[0].width, Some(2));
        // Malformed rows still parse; the registry decides to skip them.
        assert_eq!(actions[1].key, None);
    }
}
