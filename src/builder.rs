//! Store builder for flexible configuration
//!
//! This module provides a builder pattern for creating stores with a custom
//! extent, split thresholds and cache sizing.

use crate::config::{CacheConfig, Config};
use crate::db::GeoStore;
use crate::error::Result;
use crate::types::Bounds;

/// Builder for [`GeoStore`]. Settings are validated only in [`Self::build`].
#[derive(Debug, Clone, Default)]
pub struct GeoStoreBuilder {
    config: Config,
}

impl GeoStoreBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// World extent of the root cell.
    pub fn bounds(mut self, bounds: Bounds) -> Self {
        self.config.bounds = bounds;
        self
    }

    pub fn split_threshold(mut self, threshold: usize) -> Self {
        self.config.split_threshold = threshold;
        self
    }

    pub fn min_cell_size(mut self, size: f64) -> Self {
        self.config.min_cell_size = size;
        self
    }

    /// Enable the result cache with the given sizing.
    pub fn cache(mut self, max_size: usize, expunge_size: usize) -> Self {
        self.config.cache = CacheConfig::new(max_size, expunge_size);
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.config.cache = CacheConfig::disabled();
        self
    }

    /// Build the store, failing with a configuration error on invalid settings.
    pub fn build(self) -> Result<GeoStore> {
        GeoStore::with_config(self.config)
    }
}
