//! Session configuration
//!
//! Resolution order: defaults, then a YAML file, then `SCREEN_OBJECT_*`
//! environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ScreenError, ScreenResult};
use crate::wait::WaitOptions;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SCREEN_OBJECT_";

/// Default Appium server
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:4723";

/// Appium connection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppiumConfig {
    /// Base URL of the Appium server
    pub server_url: String,
    /// W3C capabilities sent on session creation
    pub capabilities: Map<String, Value>,
}

impl Default for AppiumConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            capabilities: Map::new(),
        }
    }
}

/// Timeouts and gesture timing shared by every element of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Scroll-search budget when the caller gives none
    pub scroll_timeout_ms: u64,
    /// `wait_until` budget when the caller gives none
    pub wait_timeout_ms: u64,
    /// Sleep between probes
    pub poll_interval_ms: u64,
    /// Driver implicit wait outside of searches
    pub implicit_wait_ms: u64,
    /// Duration of element scroll gestures
    pub scroll_duration_ms: u64,
    /// Duration of element swipe gestures
    pub swipe_duration_ms: u64,
    /// Appium connection
    pub appium: AppiumConfig,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            scroll_timeout_ms: 30_000,
            wait_timeout_ms: 5_000,
            poll_interval_ms: 250,
            implicit_wait_ms: 5_000,
            scroll_duration_ms: 1_000,
            swipe_duration_ms: 2_000,
            appium: AppiumConfig::default(),
        }
    }
}

impl ScreenConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set scroll-search timeout
    #[must_use]
    pub const fn with_scroll_timeout(mut self, ms: u64) -> Self {
        self.scroll_timeout_ms = ms;
        self
    }

    /// Set wait timeout
    #[must_use]
    pub const fn with_wait_timeout(mut self, ms: u64) -> Self {
        self.wait_timeout_ms = ms;
        self
    }

    /// Set poll interval
    #[must_use]
    pub const fn with_poll_interval(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set implicit wait
    #[must_use]
    pub const fn with_implicit_wait(mut self, ms: u64) -> Self {
        self.implicit_wait_ms = ms;
        self
    }

    /// Set element scroll gesture duration
    #[must_use]
    pub const fn with_scroll_duration(mut self, ms: u64) -> Self {
        self.scroll_duration_ms = ms;
        self
    }

    /// Set element swipe gesture duration
    #[must_use]
    pub const fn with_swipe_duration(mut self, ms: u64) -> Self {
        self.swipe_duration_ms = ms;
        self
    }

    /// Set Appium server URL
    #[must_use]
    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.appium.server_url = url.into();
        self
    }

    /// Add a capability
    #[must_use]
    pub fn with_capability(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.appium.capabilities.insert(name.into(), value.into());
        self
    }

    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> ScreenResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> ScreenResult<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading screen config");
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Apply `SCREEN_OBJECT_*` overrides from the process environment
    pub fn apply_env(self) -> ScreenResult<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(mut self, lookup: F) -> ScreenResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let millis = |name: &str| -> ScreenResult<Option<u64>> {
            let key = format!("{ENV_PREFIX}{name}");
            lookup(&key)
                .map(|raw| {
                    raw.trim().parse::<u64>().map_err(|_| {
                        ScreenError::config(format!("{key} must be milliseconds, got '{raw}'"))
                    })
                })
                .transpose()
        };

        if let Some(ms) = millis("SCROLL_TIMEOUT_MS")? {
            self.scroll_timeout_ms = ms;
        }
        if let Some(ms) = millis("WAIT_TIMEOUT_MS")? {
            self.wait_timeout_ms = ms;
        }
        if let Some(ms) = millis("POLL_INTERVAL_MS")? {
            self.poll_interval_ms = ms;
        }
        if let Some(ms) = millis("IMPLICIT_WAIT_MS")? {
            self.implicit_wait_ms = ms;
        }
        if let Some(ms) = millis("SCROLL_DURATION_MS")? {
            self.scroll_duration_ms = ms;
        }
        if let Some(ms) = millis("SWIPE_DURATION_MS")? {
            self.swipe_duration_ms = ms;
        }
        if let Some(url) = lookup(&format!("{ENV_PREFIX}SERVER_URL")) {
            self.appium.server_url = url;
        }

        self.validate()?;
        Ok(self)
    }

    /// Check invariants between fields
    pub fn validate(&self) -> ScreenResult<()> {
        if self.poll_interval_ms > self.scroll_timeout_ms {
            return Err(ScreenError::config(format!(
                "poll_interval_ms ({}) exceeds scroll_timeout_ms ({})",
                self.poll_interval_ms, self.scroll_timeout_ms
            )));
        }
        if self.appium.server_url.trim().is_empty() {
            return Err(ScreenError::config("appium.server_url is empty"));
        }
        Ok(())
    }

    /// Scroll-search timeout
    #[must_use]
    pub const fn scroll_timeout(&self) -> Duration {
        Duration::from_millis(self.scroll_timeout_ms)
    }

    /// Implicit wait
    #[must_use]
    pub const fn implicit_wait(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }

    /// Element scroll gesture duration
    #[must_use]
    pub const fn scroll_duration(&self) -> Duration {
        Duration::from_millis(self.scroll_duration_ms)
    }

    /// Element swipe gesture duration
    #[must_use]
    pub const fn swipe_duration(&self) -> Duration {
        Duration::from_millis(self.swipe_duration_ms)
    }

    /// Wait options for a bounded operation
    #[must_use]
    pub fn wait_options(&self, timeout: Duration) -> WaitOptions {
        WaitOptions::new()
            .with_timeout(timeout.as_millis() as u64)
            .with_poll_interval(self.poll_interval_ms)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    mod default_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let config = ScreenConfig::default();
            assert_eq!(config.scroll_timeout_ms, 30_000);
            assert_eq!(config.wait_timeout_ms, 5_000);
            assert_eq!(config.poll_interval_ms, 250);
            assert_eq!(config.scroll_duration(), Duration::from_secs(1));
            assert_eq!(config.swipe_duration(), Duration::from_secs(2));
            assert_eq!(config.appium.server_url, DEFAULT_SERVER_URL);
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_builder_chain() {
            let config = ScreenConfig::new()
                .with_scroll_timeout(1_000)
                .with_poll_interval(10)
                .with_capability("platformName", "Android");
            assert_eq!(config.scroll_timeout(), Duration::from_secs(1));
            assert_eq!(
                config.appium.capabilities["platformName"],
                Value::from("Android")
            );
            let opts = config.wait_options(Duration::from_millis(300));
            assert_eq!(opts.timeout_ms, 300);
            assert_eq!(opts.poll_interval_ms, 10);
        }
    }

    mod yaml_tests {
        use super::*;

        #[test]
        fn test_partial_yaml_keeps_defaults() {
            let config = ScreenConfig::from_yaml("scroll_timeout_ms: 2000\n").unwrap();
            assert_eq!(config.scroll_timeout_ms, 2_000);
            assert_eq!(config.swipe_duration_ms, 2_000);
        }

        #[test]
        fn test_yaml_capabilities() {
            let yaml = "appium:\n  server_url: http://grid:4723\n  capabilities:\n    platformName: iOS\n    appium:deviceName: iPhone 15\n";
            let config = ScreenConfig::from_yaml(yaml).unwrap();
            assert_eq!(config.appium.server_url, "http://grid:4723");
            assert_eq!(config.appium.capabilities.len(), 2);
        }

        #[test]
        fn test_invalid_yaml() {
            let err = ScreenConfig::from_yaml("scroll_timeout_ms: [1").unwrap_err();
            assert!(matches!(err, ScreenError::Yaml(_)));
        }

        #[test]
        fn test_from_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "poll_interval_ms: 50").unwrap();
            let config = ScreenConfig::from_file(file.path()).unwrap();
            assert_eq!(config.poll_interval_ms, 50);
        }

        #[test]
        fn test_missing_file_is_io_error() {
            let dir = tempfile::tempdir().unwrap();
            let err = ScreenConfig::from_file(dir.path().join("absent.yaml")).unwrap_err();
            assert!(matches!(err, ScreenError::Io(_)));
        }
    }

    mod env_tests {
        use super::*;

        fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
            let map: HashMap<String, String> = vars
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect();
            move |key| map.get(key).cloned()
        }

        #[test]
        fn test_env_overrides() {
            let config = ScreenConfig::default()
                .apply_env_from(lookup(&[
                    ("SCREEN_OBJECT_SCROLL_TIMEOUT_MS", "1000"),
                    ("SCREEN_OBJECT_SERVER_URL", "http://device-farm:4723"),
                ]))
                .unwrap();
            assert_eq!(config.scroll_timeout_ms, 1_000);
            assert_eq!(config.appium.server_url, "http://device-farm:4723");
        }

        #[test]
        fn test_env_rejects_non_numeric() {
            let err = ScreenConfig::default()
                .apply_env_from(lookup(&[("SCREEN_OBJECT_POLL_INTERVAL_MS", "fast")]))
                .unwrap_err();
            assert!(err.to_string().contains("SCREEN_OBJECT_POLL_INTERVAL_MS"));
        }

        #[test]
        fn test_validation_poll_exceeds_timeout() {
            let err = ScreenConfig::default()
                .apply_env_from(lookup(&[("SCREEN_OBJECT_SCROLL_TIMEOUT_MS", "100")]))
                .unwrap_err();
            assert!(matches!(err, ScreenError::Config { .. }));
        }
    }
}
