//! Monitor configuration.
//!
//! The configuration names which (stop, route) pairs to request and how
//! often to poll. It is loaded once at startup, from a JSON file when
//! `MUNI_CONFIG` is set, and otherwise defaults to a small set of San
//! Francisco stops. A reconfiguration replaces the whole value.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::{RouteTag, StopTag};

/// Default polling interval (one minute).
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 60_000;

/// Environment variable naming the JSON configuration file.
pub const CONFIG_PATH_ENV: &str = "MUNI_CONFIG";

/// Errors loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not valid JSON for this schema
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Values parsed but are unusable
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Routes to monitor at one stop.
#[derive(Debug, Clone, PartialEq, Eq)]
struct StopRoutes {
    stop: StopTag,
    routes: Vec<RouteTag>,
}

/// Ordered mapping from stop tag to the routes monitored there.
///
/// Iteration follows the order entries were written in the configuration
/// source, which in turn fixes the order of the `stops` query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StopConfig {
    entries: Vec<StopRoutes>,
}

impl StopConfig {
    /// Build from `(stop, [routes])` string pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a [&'a str])>) -> Self {
        let entries = pairs
            .into_iter()
            .map(|(stop, routes)| StopRoutes {
                stop: StopTag::new(stop),
                routes: routes.iter().map(|r| RouteTag::new(*r)).collect(),
            })
            .collect();
        Self { entries }
    }

    /// Every (stop, route) pair, stops in order then routes in order.
    pub fn pairs(&self) -> impl Iterator<Item = (&StopTag, &RouteTag)> {
        self.entries
            .iter()
            .flat_map(|e| e.routes.iter().map(move |r| (&e.stop, r)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for StopConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.stop, &entry.routes)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StopConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StopConfigVisitor;

        impl<'de> Visitor<'de> for StopConfigVisitor {
            type Value = StopConfig;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map from stop tag to a list of route tags")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<StopConfig, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((stop, routes)) = access.next_entry::<StopTag, Vec<RouteTag>>()? {
                    entries.push(StopRoutes { stop, routes });
                }
                Ok(StopConfig { entries })
            }
        }

        deserializer.deserialize_map(StopConfigVisitor)
    }
}

/// Full configuration for the monitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorConfig {
    /// Stops and routes to request.
    pub stops: StopConfig,

    /// Polling interval in milliseconds.
    #[serde(default = "default_update_interval_ms", rename = "updateInterval")]
    pub update_interval_ms: u64,

    /// NextBus agency tag.
    #[serde(default)]
    pub agency: Option<String>,

    /// Override for the feed endpoint (tests and local mirrors).
    #[serde(default)]
    pub base_url: Option<String>,
}

fn default_update_interval_ms() -> u64 {
    DEFAULT_UPDATE_INTERVAL_MS
}

impl MonitorConfig {
    /// Create a config for the given stops with default interval and endpoint.
    pub fn new(stops: StopConfig) -> Self {
        Self {
            stops,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
            agency: None,
            base_url: None,
        }
    }

    /// Set the polling interval.
    pub fn with_update_interval_ms(mut self, ms: u64) -> Self {
        self.update_interval_ms = ms;
        self
    }

    /// Returns the polling interval as a Duration.
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval_ms)
    }

    /// Check that the values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "updateInterval must be a positive number of milliseconds".into(),
            ));
        }
        if self.stops.pairs().next().is_none() {
            return Err(ConfigError::Invalid(
                "at least one stop/route pair must be configured".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a config from JSON text.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: MonitorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Load from the file named by `MUNI_CONFIG`, or fall back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new(StopConfig::from_pairs([
            ("6994", &["J", "KT", "L", "M", "N"][..]),
            ("3328", &["33"][..]),
        ]))
    }
}
