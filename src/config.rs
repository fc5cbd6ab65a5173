//! Store configuration.
//!
//! World extent, split thresholds and cache sizing are explicit per-store
//! settings rather than process-wide constants. The type is serializable so
//! it can be loaded from JSON (or TOML with the `toml` feature).
use crate::error::{GeoStoreError, Result};
use crate::types::Bounds;
use serde::{Deserialize, Serialize};

/// Store configuration.
///
/// # Example
///
/// ```rust
/// use geostore::Config;
///
/// let json = r#"{
///     "split_threshold": 4,
///     "cache": { "max_size": 50, "expunge_size": 25 }
/// }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.split_threshold, 4);
/// assert_eq!(config.bounds.x1, 256.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// World extent used by a fresh store and by `reset(None)`.
    #[serde(default)]
    pub bounds: Bounds,

    /// A leaf splits once it holds more than this many points.
    #[serde(default = "Config::default_split_threshold")]
    pub split_threshold: usize,

    /// Leaves at or below this side length never split.
    #[serde(default = "Config::default_min_cell_size")]
    pub min_cell_size: f64,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Sizing of the query result cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    #[serde(default = "CacheConfig::default_enabled")]
    pub enabled: bool,

    /// Entries held before an eviction round is triggered. Must exceed 2.
    #[serde(default = "CacheConfig::default_max_size")]
    pub max_size: usize,

    /// Oldest-accessed entries dropped per eviction round. Must be below `max_size`.
    #[serde(default = "CacheConfig::default_expunge_size")]
    pub expunge_size: usize,
}

impl CacheConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_max_size() -> usize {
        20
    }

    const fn default_expunge_size() -> usize {
        10
    }

    pub fn new(max_size: usize, expunge_size: usize) -> Self {
        Self {
            enabled: true,
            max_size,
            expunge_size,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_size <= 2 {
            return Err(GeoStoreError::Configuration(format!(
                "Cache max_size must be greater than 2, got {}",
                self.max_size
            )));
        }
        if self.expunge_size >= self.max_size {
            return Err(GeoStoreError::Configuration(format!(
                "Cache expunge_size ({}) must be less than max_size ({})",
                self.expunge_size, self.max_size
            )));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            max_size: Self::default_max_size(),
            expunge_size: Self::default_expunge_size(),
        }
    }
}

impl Config {
    const fn default_split_threshold() -> usize {
        2
    }

    // 2^-24: roughly 2.5 m if the unit length is the equator.
    const fn default_min_cell_size() -> f64 {
        1.0 / 16_777_216.0
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_split_threshold(mut self, threshold: usize) -> Self {
        assert!(threshold > 0, "Split threshold must be greater than zero");
        self.split_threshold = threshold;
        self
    }

    pub fn with_min_cell_size(mut self, size: f64) -> Self {
        assert!(
            size.is_finite() && size > 0.0,
            "Minimum cell size must be positive and finite"
        );
        self.min_cell_size = size;
        self
    }

    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.bounds.validate()?;

        if self.split_threshold == 0 {
            return Err(GeoStoreError::Configuration(
                "Split threshold must be greater than zero".to_string(),
            ));
        }

        if !self.min_cell_size.is_finite() || self.min_cell_size <= 0.0 {
            return Err(GeoStoreError::Configuration(format!(
                "Minimum cell size must be positive and finite, got {}",
                self.min_cell_size
            )));
        }

        if self.min_cell_size >= self.bounds.size() {
            log::warn!(
                "Minimum cell size {} is not below the world size {}; the root will never split",
                self.min_cell_size,
                self.bounds.size()
            );
        }

        if self.cache.enabled {
            self.cache.validate()?;
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            split_threshold: Self::default_split_threshold(),
            min_cell_size: Self::default_min_cell_size(),
            cache: CacheConfig::default(),
        }
    }
}
