//! Thread-safe wrapper for concurrent store access.
//!
//! This module provides `SyncGeoStore`, a wrapper around `GeoStore` that
//! uses `Arc<RwLock<GeoStore>>` internally to enforce the single-writer
//! discipline the quadtree relies on.
//!
//! # Features
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! geostore = { version = "0.1", features = ["sync"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use geostore::SyncGeoStore;
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = SyncGeoStore::new()?;
//! let writer = store.clone();
//!
//! let handle = thread::spawn(move || {
//!     writer.insert(10.0, 10.0);
//! });
//! handle.join().unwrap();
//!
//! assert_eq!(store.len(), 1);
//! # Ok(())
//! # }
//! ```

use super::GeoStore;
use crate::{Bounds, CellInfo, Config, QueryOptions, QueryResponse, QueryResult, Result, StoreStats};
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe wrapper around `GeoStore` using `Arc<RwLock<GeoStore>>`.
///
/// Inserts, resets and cached queries take the write lock, because a cache
/// hit reorders the cache and a miss stores into it. Uncached `find`,
/// enumeration and statistics take the read lock and run concurrently.
#[derive(Clone)]
pub struct SyncGeoStore {
    inner: Arc<RwLock<GeoStore>>,
}

impl SyncGeoStore {
    pub fn new() -> Result<Self> {
        Ok(Self::from(GeoStore::new()?))
    }

    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self::from(GeoStore::with_config(config)?))
    }

    pub fn insert(&self, x: f64, y: f64) {
        self.inner.write().insert(x, y)
    }

    pub fn reset(&self, bounds: Option<Bounds>) -> Result<()> {
        self.inner.write().reset(bounds)
    }

    pub fn query(
        &self,
        x: f64,
        y: f64,
        radius: f64,
        options: QueryOptions,
    ) -> Result<QueryResponse> {
        self.inner.write().query(x, y, radius, options)
    }

    pub fn find(&self, x: f64, y: f64, radius: f64, limit: Option<usize>) -> Result<QueryResult> {
        self.inner.read().find(x, y, radius, limit)
    }

    pub fn enumerate(&self) -> Vec<CellInfo> {
        self.inner.read().enumerate()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn stats(&self) -> StoreStats {
        self.inner.read().stats()
    }

    /// Run `f` with shared access to the underlying store.
    pub fn read<R>(&self, f: impl FnOnce(&GeoStore) -> R) -> R {
        f(&self.inner.read())
    }

    /// Run `f` with exclusive access to the underlying store.
    pub fn write<R>(&self, f: impl FnOnce(&mut GeoStore) -> R) -> R {
        f(&mut self.inner.write())
    }
}

impl From<GeoStore> for SyncGeoStore {
    fn from(store: GeoStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(store)),
        }
    }
}
