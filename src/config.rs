//! Bridge configuration persistence
//!
//! Stores settings in `~/.config/editor-bridge/config.yaml`

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::theme::ThemeConfig;

/// Quiescence window before an autosave notification fires
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 1000;

/// How many characters the console keeps when text is appended
pub const DEFAULT_APPEND_LIMIT: usize = 2000;

/// Bridge configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    #[serde(default = "default_append_limit")]
    pub append_limit: usize,

    /// Forward lifecycle events to the host. Off until the host wires its callbacks.
    #[serde(default)]
    pub notify_host: bool,

    /// Font size applied right after the first mount
    #[serde(default)]
    pub text_size: Option<u32>,

    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_autosave_delay_ms() -> u64 {
    DEFAULT_AUTOSAVE_DELAY_MS
}

fn default_append_limit() -> usize {
    DEFAULT_APPEND_LIMIT
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: default_autosave_delay_ms(),
            append_limit: default_append_limit(),
            notify_host: false,
            text_size: None,
            theme: ThemeConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from an explicit path, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to an explicit path
    ///
    /// Creates the parent directory if it doesn't exist.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn autosave_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.autosave_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.autosave_delay_ms, 1000);
        assert_eq!(config.append_limit, 2000);
        assert!(!config.notify_host);
        assert_eq!(config.text_size, None);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: BridgeConfig = serde_yaml::from_str("notify_host: true\n").unwrap();
        assert!(config.notify_host);
        assert_eq!(config.autosave_delay_ms, DEFAULT_AUTOSAVE_DELAY_MS);
        assert_eq!(config.theme, ThemeConfig::default());
    }

    #[test]
    fn test_autosave_delay_duration() {
        let config = BridgeConfig {
            autosave_delay_ms: 250,
            ..BridgeConfig::default()
        };
        assert_eq!(config.autosave_delay(), std::time::Duration::from_millis(250));
    }
}
