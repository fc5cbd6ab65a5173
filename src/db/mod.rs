//! Core store implementation for geostore.
//!
//! This module defines the `GeoStore` type that ties the quadtree index to
//! the query result cache and exposes the four boundary operations: insert,
//! reset, query and enumerate.

use crate::compute::spatial::QuadTree;
use crate::compute::validation::parse_coordinate;
use crate::config::Config;
use crate::error::{GeoStoreError, Result};
use crate::types::{Bounds, CellInfo, QueryOptions, QueryResponse, QueryResult, StoreStats};
use geo::Point;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

mod cache;

#[cfg(feature = "sync")]
mod sync;

pub use cache::{QueryKey, ResultCache};

#[cfg(feature = "sync")]
pub use sync::SyncGeoStore;

/// In-memory 2D point store backed by a neighbor-linked quadtree.
///
/// # Thread Safety
///
/// `GeoStore` has no internal locking. Inserts and splits mutate shared node
/// state, and cached queries update the cache's access order, so all of
/// those need `&mut self`. To share a store between threads enable the
/// `sync` feature and use `SyncGeoStore`, or wrap it yourself:
///
/// ```rust
/// use geostore::GeoStore;
/// use parking_lot::RwLock;
/// use std::sync::Arc;
///
/// let store = Arc::new(RwLock::new(GeoStore::new().unwrap()));
/// let writer = Arc::clone(&store);
///
/// std::thread::spawn(move || writer.write().insert(1.0, 2.0))
///     .join()
///     .unwrap();
/// assert_eq!(store.read().len(), 1);
/// ```
///
/// # Examples
///
/// ```rust
/// use geostore::{GeoStore, QueryOptions};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut store = GeoStore::new()?;
/// store.insert(10.0, 10.0);
/// store.insert(12.0, 10.0);
/// store.insert(100.0, 100.0);
///
/// let response = store.query(10.0, 10.0, 5.0, QueryOptions::default())?;
/// assert_eq!(response.match_count, 2);
/// assert!(!response.cache_hit);
///
/// let again = store.query(10.0, 10.0, 5.0, QueryOptions::default())?;
/// assert!(again.cache_hit);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GeoStore {
    tree: QuadTree,
    cache: Option<ResultCache<Arc<QueryResult>>>,
    config: Config,
}

impl GeoStore {
    /// Store over the default 256x256 extent with default thresholds.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    /// Validates `config` and builds an empty store from it.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        let cache = if config.cache.enabled {
            Some(ResultCache::from_config(&config.cache)?)
        } else {
            None
        };
        Ok(Self {
            tree: QuadTree::from_config(&config),
            cache,
            config,
        })
    }

    /// Create a store builder for advanced configuration.
    ///
    /// ```rust
    /// use geostore::{Bounds, GeoStore};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let store = GeoStore::builder()
    ///     .bounds(Bounds::new(-180.0, -90.0, 180.0, 90.0))
    ///     .split_threshold(16)
    ///     .without_cache()
    ///     .build()?;
    /// assert!(store.is_empty());
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder() -> crate::builder::GeoStoreBuilder {
        crate::builder::GeoStoreBuilder::new()
    }

    pub fn tree(&self) -> &QuadTree {
        &self.tree
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Number of stored points.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Add a point. Never fails; duplicates are kept as distinct points.
    ///
    /// Cached query results are dropped since they no longer reflect the tree.
    pub fn insert(&mut self, x: f64, y: f64) {
        self.insert_point(Point::new(x, y));
    }

    pub fn insert_point(&mut self, point: Point<f64>) {
        self.tree.insert(point);
        self.clear_cache();
    }

    /// Discard every point and start over with an empty root.
    ///
    /// `bounds` defaults to the configured world extent. Invalid bounds are
    /// rejected before the current tree is touched.
    pub fn reset(&mut self, bounds: Option<Bounds>) -> Result<()> {
        let bounds = bounds.unwrap_or(self.config.bounds);
        bounds.validate()?;

        log::info!(
            "Resetting store with {} points over {:?}",
            self.tree.len(),
            bounds
        );
        self.tree = self.tree.with_bounds(bounds);
        self.clear_cache();
        Ok(())
    }

    /// Radius query with pagination and an optional cost limit.
    ///
    /// A result for the exact `(x, y, radius)` triple is served from the
    /// cache when present, in which case `options.limit` is not consulted.
    /// Otherwise the query runs against the tree; on
    /// [`GeoStoreError::CandidateOverflow`] nothing is cached.
    pub fn query(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        options: QueryOptions,
    ) -> Result<QueryResponse> {
        let key = QueryKey::new(x, y, radius);
        let cached = self
            .cache
            .as_mut()
            .and_then(|cache| cache.get(&key))
            .cloned();

        let (result, cache_hit) = match cached {
            Some(result) => (result, true),
            None => {
                let result = Arc::new(self.tree.find(x, y, radius, options.limit)?);
                if let Some(cache) = self.cache.as_mut() {
                    cache.insert(key, Arc::clone(&result));
                }
                (result, false)
            }
        };

        Ok(QueryResponse {
            request_x: x,
            request_y: y,
            request_r: radius,
            count: options.count,
            offset: options.offset,
            cache_hit,
            estimate: result.estimate,
            cells_visited: result.cells_visited,
            match_count: result.match_count,
            entities: options.page(&result.entities).to_vec(),
        })
    }

    /// Uncached radius query straight against the tree.
    pub fn find(&self, x: f64, y: f64, radius: f64, limit: Option<usize>) -> Result<QueryResult> {
        self.tree.find(x, y, radius, limit)
    }

    /// Descriptor of every cell, parents before children.
    pub fn enumerate(&self) -> Vec<CellInfo> {
        self.tree.cells()
    }

    /// [`Self::enumerate`] as a JSON array.
    pub fn enumerate_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.enumerate())?)
    }

    /// Every stored point, in leaf order.
    pub fn entities(&self) -> impl Iterator<Item = Point<f64>> + '_ {
        self.tree.entities_under(QuadTree::ROOT)
    }

    /// Bulk-load `x,y` rows (no header). Returns the number of points added.
    ///
    /// Every row is parsed before anything is inserted, so a malformed row
    /// leaves the store untouched.
    pub fn load_csv<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut points = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() != 2 {
                return Err(GeoStoreError::InvalidInput(format!(
                    "Row {} has {} fields, expected x,y",
                    row + 1,
                    record.len()
                )));
            }
            let x = parse_coordinate("x", &record[0])
                .map_err(|e| GeoStoreError::InvalidInput(format!("Row {}: {}", row + 1, e)))?;
            let y = parse_coordinate("y", &record[1])
                .map_err(|e| GeoStoreError::InvalidInput(format!("Row {}: {}", row + 1, e)))?;
            points.push(Point::new(x, y));
        }

        let loaded = points.len();
        for point in points {
            self.tree.insert(point);
        }
        self.clear_cache();
        log::info!("Loaded {} points", loaded);
        Ok(loaded)
    }

    pub fn load_csv_path<P: AsRef<Path>>(&mut self, path: P) -> Result<usize> {
        let file = File::open(path)?;
        self.load_csv(BufReader::new(file))
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            points: self.tree.len(),
            cells: self.tree.cell_count(),
            depth: self.tree.depth(),
            cached_results: self.cache.as_ref().map_or(0, |cache| cache.len()),
        }
    }

    pub fn clear_cache(&mut self) {
        if let Some(cache) = self.cache.as_mut() {
            cache.clear();
        }
    }
}
