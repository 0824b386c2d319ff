use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "labscan";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entities scored below this are ignored.
pub const DEFAULT_MIN_ENTITY_CONFIDENCE: f32 = 0.70;
/// Characters searched on each side of an entity for its value.
pub const DEFAULT_CONTEXT_WINDOW: usize = 50;
/// Relative difference under which two same-named values are the same reading.
pub const DEFAULT_DUPLICATE_TOLERANCE: f64 = 0.05;
pub const DEFAULT_BACKEND_TIMEOUT_SECS: u64 = 30;

pub const ENV_MIN_CONFIDENCE: &str = "LABSCAN_MIN_CONFIDENCE";
pub const ENV_CONTEXT_WINDOW: &str = "LABSCAN_CONTEXT_WINDOW";
pub const ENV_DUPLICATE_TOLERANCE: &str = "LABSCAN_DUPLICATE_TOLERANCE";
pub const ENV_BACKEND_TIMEOUT_SECS: &str = "LABSCAN_BACKEND_TIMEOUT_SECS";
pub const ENV_BACKEND_URL: &str = "LABSCAN_BACKEND_URL";

/// Fallback filter when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "labscan=info,warn"
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("{key} out of range: {reason}")]
    OutOfRange { key: &'static str, reason: String },
}

/// Tunables for one extraction engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub min_entity_confidence: f32,
    pub context_window: usize,
    pub duplicate_tolerance: f64,
    pub backend_timeout_secs: u64,
    /// Base URL of a remote tagging service. `None` runs pattern-only.
    pub backend_url: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_entity_confidence: DEFAULT_MIN_ENTITY_CONFIDENCE,
            context_window: DEFAULT_CONTEXT_WINDOW,
            duplicate_tolerance: DEFAULT_DUPLICATE_TOLERANCE,
            backend_timeout_secs: DEFAULT_BACKEND_TIMEOUT_SECS,
            backend_url: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `LABSCAN_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, ENV_MIN_CONFIDENCE)? {
            config.min_entity_confidence = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_CONTEXT_WINDOW)? {
            config.context_window = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_DUPLICATE_TOLERANCE)? {
            config.duplicate_tolerance = v;
        }
        if let Some(v) = parse_var(&lookup, ENV_BACKEND_TIMEOUT_SECS)? {
            config.backend_timeout_secs = v;
        }
        if let Some(url) = lookup(ENV_BACKEND_URL) {
            let url = url.trim();
            if !url.is_empty() {
                config.backend_url = Some(url.to_string());
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.min_entity_confidence) {
            return Err(ConfigError::OutOfRange {
                key: ENV_MIN_CONFIDENCE,
                reason: format!("{} not in [0, 1]", self.min_entity_confidence),
            });
        }
        if !(self.duplicate_tolerance > 0.0 && self.duplicate_tolerance < 1.0) {
            return Err(ConfigError::OutOfRange {
                key: ENV_DUPLICATE_TOLERANCE,
                reason: format!("{} not in (0, 1)", self.duplicate_tolerance),
            });
        }
        if self.backend_timeout_secs == 0 {
            return Err(ConfigError::OutOfRange {
                key: ENV_BACKEND_TIMEOUT_SECS,
                reason: "timeout must be at least 1 second".into(),
            });
        }
        Ok(())
    }
}

fn parse_var<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn app_name_is_labscan() {
        assert_eq!(APP_NAME, "labscan");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn defaults_match_documented_thresholds() {
        let config = EngineConfig::default();
        assert_eq!(config.min_entity_confidence, 0.70);
        assert_eq!(config.context_window, 50);
        assert_eq!(config.duplicate_tolerance, 0.05);
        assert!(config.backend_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = EngineConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn environment_overrides_apply() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (ENV_MIN_CONFIDENCE, "0.85"),
            (ENV_CONTEXT_WINDOW, "80"),
            (ENV_BACKEND_TIMEOUT_SECS, "5"),
            (ENV_BACKEND_URL, " http://localhost:8080 "),
        ]))
        .unwrap();
        assert_eq!(config.min_entity_confidence, 0.85);
        assert_eq!(config.context_window, 80);
        assert_eq!(config.backend_timeout_secs, 5);
        assert_eq!(config.backend_url.as_deref(), Some("http://localhost:8080"));
    }

    #[test]
    fn blank_backend_url_is_ignored() {
        let config = EngineConfig::from_lookup(lookup_from(&[(ENV_BACKEND_URL, "  ")])).unwrap();
        assert!(config.backend_url.is_none());
    }

    #[test]
    fn unparseable_value_is_an_error() {
        let err = EngineConfig::from_lookup(lookup_from(&[(ENV_CONTEXT_WINDOW, "wide")]))
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: ENV_CONTEXT_WINDOW,
                value: "wide".into()
            }
        );
    }

    #[test]
    fn out_of_range_confidence_rejected() {
        let err = EngineConfig::from_lookup(lookup_from(&[(ENV_MIN_CONFIDENCE, "1.5")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { key: ENV_MIN_CONFIDENCE, .. }));
    }

    #[test]
    fn zero_timeout_rejected() {
        let config = EngineConfig {
            backend_timeout_secs: 0,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
