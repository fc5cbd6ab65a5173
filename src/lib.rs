//! In-memory 2D point store with a neighbor-linked adaptive quadtree for
//! bounded radius queries, plus a bounded cache of query results.
//!
//! ```rust
//! use geostore::{GeoStore, QueryOptions};
//!
//! let mut store = GeoStore::new()?;
//! store.insert(10.0, 10.0);
//! store.insert(10.0, 10.0);
//! store.insert(65.0, 65.0);
//!
//! let response = store.query(10.0, 10.0, 0.1, QueryOptions::default())?;
//! assert_eq!(response.match_count, 2);
//!
//! let cells = store.enumerate();
//! assert_eq!(cells[0].entity_count, 3);
//! # Ok::<(), geostore::GeoStoreError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod db;
pub mod error;
pub mod types;

pub use builder::GeoStoreBuilder;
pub use config::{CacheConfig, Config};
pub use db::{GeoStore, QueryKey, ResultCache};
pub use error::{GeoStoreError, Result};

#[cfg(feature = "sync")]
pub use db::SyncGeoStore;

pub use compute::spatial::{NodeId, QuadTree, Quadrant};

pub use geo::Point;

pub use types::{Bounds, CellInfo, Match, QueryOptions, QueryResponse, QueryResult, StoreStats};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{GeoStore, GeoStoreBuilder, GeoStoreError, Result};

    pub use geo::Point;

    pub use crate::{Bounds, CacheConfig, Config, QueryOptions, QueryResponse};

    #[cfg(feature = "sync")]
    pub use crate::SyncGeoStore;
}
