//! Scan configuration
//!
//! Operator-tunable knobs for a watcher: pagination bounds, the retry
//! budget, and the ignore list. Stored as JSON; missing fields fall back to
//! defaults so a partial file stays valid.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::filter::ScopeFilter;
use crate::page::DEFAULT_MAX_PAGES;
use crate::retry::RetryPolicy;

/// Watcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Cap on pages walked per listing.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
    /// Total rate-limited attempts per remote call, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first rate-limit retry, in milliseconds.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Ceiling on any single backoff sleep, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Identity prefixes excluded from collection.
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

fn default_max_attempts() -> u32 {
    RetryPolicy::default().max_attempts
}

fn default_base_delay_ms() -> u64 {
    RetryPolicy::default().base_delay.as_millis() as u64
}

fn default_max_delay_ms() -> u64 {
    RetryPolicy::default().max_delay.as_millis() as u64
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            ignore: Vec::new(),
        }
    }
}

impl ScanConfig {
    /// Get the default config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("driftwatch").join("config.json"))
    }

    /// Load configuration from the default location, falling back to
    /// defaults when the file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from an explicit path.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("failed to parse config from {}", path.display()))
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// The retry policy this configuration describes.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.base_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
        }
    }

    /// The ignore-list filter this configuration describes.
    pub fn scope_filter(&self) -> ScopeFilter {
        ScopeFilter::new(self.ignore.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: ScanConfig = serde_json::from_str(r#"{"ignore": ["tmp-"]}"#).unwrap();
        assert_eq!(config.max_pages, DEFAULT_MAX_PAGES);
        assert_eq!(config.max_attempts, RetryPolicy::default().max_attempts);
        assert_eq!(config.ignore, vec!["tmp-".to_string()]);
    }

    #[test]
    fn retry_policy_round_trips_delays() {
        let config = ScanConfig {
            max_attempts: 3,
            base_delay_ms: 50,
            max_delay_ms: 400,
            ..ScanConfig::default()
        };
        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.base_delay, Duration::from_millis(50));
        assert_eq!(policy.max_delay, Duration::from_millis(400));
    }

    #[test]
    fn scope_filter_uses_ignore_patterns() {
        let config = ScanConfig {
            ignore: vec!["scratch-".into()],
            ..ScanConfig::default()
        };
        assert!(config.scope_filter().is_ignored("scratch-topic"));
        assert!(!config.scope_filter().is_ignored("prod-topic"));
    }
}
