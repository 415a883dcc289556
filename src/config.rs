//! Timing configuration for the page controller.
//!
//! Every field has a default, so an empty YAML document (or no file at all)
//! yields the stock page behavior:
//!
//! ```yaml
//! refresh_period_ms: 300000
//! button_loading_fallback_ms: 3000
//! notification_ttl_ms: 5000
//! scroll_threshold_px: 300
//! auto_refresh: true
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, instrument};

use crate::error::PageError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    /// Period of the background refresh timer.
    pub refresh_period_ms: u64,
    /// How long a button stays in its loading state before it is restored,
    /// whether or not the operation behind it has finished.
    pub button_loading_fallback_ms: u64,
    /// Lifetime of a notification that nobody closes.
    pub notification_ttl_ms: u64,
    /// Scroll offset above which the scroll-to-top button is shown.
    pub scroll_threshold_px: f64,
    /// Whether the background refresh timer runs at all.
    pub auto_refresh: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            refresh_period_ms: 300_000,
            button_loading_fallback_ms: 3_000,
            notification_ttl_ms: 5_000,
            scroll_threshold_px: 300.0,
            auto_refresh: true,
        }
    }
}

impl PageConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, PageError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PageError> {
        let raw = fs::read_to_string(path.as_ref()).await?;
        let config = Self::from_yaml_str(&raw)?;
        info!(?config, "Loaded page configuration");
        Ok(config)
    }

    /// Never zero; a zero period would spin the timer.
    pub fn refresh_period(&self) -> Duration {
        Duration::from_millis(self.refresh_period_ms.max(1))
    }

    pub fn button_loading_fallback(&self) -> Duration {
        Duration::from_millis(self.button_loading_fallback_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PageConfig::default();
        assert_eq!(config.refresh_period(), Duration::from_secs(300));
        assert_eq!(config.button_loading_fallback(), Duration::from_secs(3));
        assert_eq!(config.notification_ttl(), Duration::from_secs(5));
        assert_eq!(config.scroll_threshold_px, 300.0);
        assert!(config.auto_refresh);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = PageConfig::from_yaml_str("refresh_period_ms: 60000\nauto_refresh: false\n").unwrap();
        assert_eq!(config.refresh_period(), Duration::from_secs(60));
        assert!(!config.auto_refresh);
        assert_eq!(config.notification_ttl_ms, 5_000);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(PageConfig::from_yaml_str("  \n").unwrap(), PageConfig::default());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let err = PageConfig::from_yaml_str("refresh_period_ms: soon").unwrap_err();
        assert_eq!(err.error_code(), "page.config_invalid");
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let config = PageConfig {
            refresh_period_ms: 0,
            ..PageConfig::default()
        };
        assert_eq!(config.refresh_period(), Duration::from_millis(1));
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "notification_ttl_ms: 1500").unwrap();
        let config = PageConfig::load(file.path()).await.unwrap();
        assert_eq!(config.notification_ttl(), Duration::from_millis(1500));
    }
}
