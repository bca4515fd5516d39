use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{FavaError, Result};

/// FAVA weekly source-list endpoint.
pub const DEFAULT_API_URL: &str =
    "https://fermi.gsfc.nasa.gov/ssc/data/access/lat/FAVA/queryDB_2FAV.php";

/// Minimum detection significance (sigma) for listed sources.
pub const DEFAULT_THRESHOLD: f64 = 6.0;

pub const DEFAULT_START_WEEK: u32 = 1;
pub const DEFAULT_END_WEEK: u32 = 721;

// ---------------------------------------------------------------------------
// Client configuration
// ---------------------------------------------------------------------------

/// Settings for talking to the FAVA service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FavaConfig {
    /// Base URL of the source-list query endpoint.
    pub api_url: String,
    /// Per-request timeout in seconds. `0` disables the timeout.
    pub timeout_secs: u64,
    pub threshold: f64,
    /// Concurrent week downloads. `1` fetches sequentially.
    pub workers: usize,
}

impl Default for FavaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: 30,
            threshold: DEFAULT_THRESHOLD,
            workers: 1,
        }
    }
}

impl FavaConfig {
    /// Defaults overridden by `FAVA_API_URL`, `FAVA_TIMEOUT_SECS`,
    /// `FAVA_THRESHOLD` and `FAVA_WORKERS` when set.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Apply the `FAVA_*` environment overrides on top of `self`.
    pub fn with_env(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Load a JSON config file; missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| FavaError::Config(format!("reading {}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| FavaError::Config(format!("parsing {}: {e}", path.display())))
    }

    /// Apply overrides from a key lookup (environment by default).
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(url) = lookup("FAVA_API_URL") {
            self.api_url = url;
        }
        if let Some(raw) = lookup("FAVA_TIMEOUT_SECS") {
            self.timeout_secs = parse_var("FAVA_TIMEOUT_SECS", &raw)?;
        }
        if let Some(raw) = lookup("FAVA_THRESHOLD") {
            self.threshold = parse_var("FAVA_THRESHOLD", &raw)?;
        }
        if let Some(raw) = lookup("FAVA_WORKERS") {
            self.workers = parse_var("FAVA_WORKERS", &raw)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_url.trim().is_empty() {
            return Err(FavaError::Config("api_url is empty".into()));
        }
        if !self.threshold.is_finite() {
            return Err(FavaError::Config(format!(
                "threshold must be finite, got {}",
                self.threshold
            )));
        }
        if self.workers == 0 {
            return Err(FavaError::Config("workers must be at least 1".into()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| FavaError::Config(format!("{key}={raw:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_service() {
        let config = FavaConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.threshold, 6.0);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        config.validate().unwrap();
    }

    #[test]
    fn overrides_apply() {
        let config = FavaConfig::default()
            .with_overrides(lookup(&[
                ("FAVA_API_URL", "http://localhost:8080/q.php"),
                ("FAVA_THRESHOLD", "4.5"),
                ("FAVA_WORKERS", "8"),
                ("FAVA_TIMEOUT_SECS", "0"),
            ]))
            .unwrap();

        assert_eq!(config.api_url, "http://localhost:8080/q.php");
        assert_eq!(config.threshold, 4.5);
        assert_eq!(config.workers, 8);
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn bad_override_is_config_error() {
        let err = FavaConfig::default()
            .with_overrides(lookup(&[("FAVA_WORKERS", "many")]))
            .unwrap_err();
        assert!(err.to_string().contains("FAVA_WORKERS"));

        let err = FavaConfig::default()
            .with_overrides(lookup(&[("FAVA_WORKERS", "0")]))
            .unwrap_err();
        assert!(matches!(err, FavaError::Config(_)));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config: FavaConfig = serde_json::from_str(r#"{ "threshold": 3 }"#).unwrap();
        assert_eq!(config.threshold, 3.0);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.workers, 1);
    }
}
