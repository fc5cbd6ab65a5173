//! Compute layer for indexing and query processing.
//!
//! This module separates the index and query logic from the store facade.
//! It provides:
//! - The neighbor-linked quadtree and its radius queries
//! - Request parameter validation for boundary layers
//! - GeoJSON rendering of the cell layout (feature `geojson`)

pub mod spatial;
pub mod validation;

#[cfg(feature = "geojson")]
pub mod geojson;
