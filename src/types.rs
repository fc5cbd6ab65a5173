//! Value types shared by the index, the store and the boundary helpers.
//!
//! Everything here is serializable so the request layer can hand results
//! straight to `serde_json` without intermediate conversions.
use crate::error::{GeoStoreError, Result};
use geo::{Point, Rect, coord};
use serde::{Deserialize, Serialize};

/// Axis-aligned extent `[x0, y0]`–`[x1, y1]`.
///
/// The y axis grows downwards: `y0` is the top edge and `y1` the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Bounds {
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        (self.x1 - self.x0).abs()
    }

    pub fn height(&self) -> f64 {
        (self.y1 - self.y0).abs()
    }

    /// Side length used for split and search decisions: `min(width, height)`.
    pub fn size(&self) -> f64 {
        self.width().min(self.height())
    }

    /// Midpoint of the extent.
    pub fn centroid(&self) -> (f64, f64) {
        (
            (self.x1 - self.x0) / 2.0 + self.x0,
            (self.y1 - self.y0) / 2.0 + self.y0,
        )
    }

    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.x0, self.y0),
            (self.x0, self.y1),
            (self.x1, self.y1),
            (self.x1, self.y0),
        ]
    }

    /// Closed containment test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.y0..=self.y1).contains(&y)
    }

    /// Rejects non-finite or degenerate extents.
    pub fn validate(&self) -> Result<()> {
        if ![self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(GeoStoreError::Configuration(format!(
                "Bounds must be finite, got {:?}",
                self
            )));
        }
        if self.x1 <= self.x0 || self.y1 <= self.y0 {
            return Err(GeoStoreError::Configuration(format!(
                "Bounds must satisfy x0 < x1 and y0 < y1, got {:?}",
                self
            )));
        }
        Ok(())
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0.0, 0.0, 256.0, 256.0)
    }
}

impl From<Rect<f64>> for Bounds {
    fn from(rect: Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}

impl From<Bounds> for Rect<f64> {
    fn from(bounds: Bounds) -> Self {
        Rect::new(
            coord! { x: bounds.x0, y: bounds.y0 },
            coord! { x: bounds.x1, y: bounds.y1 },
        )
    }
}

/// A single radius match: the point and its exact distance to the target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub distance: f64,
    pub point: Point<f64>,
}

/// Outcome of a radius query against the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// Pre-scan candidate estimate (approximate, see [`crate::compute::spatial::QuadTree::find`]).
    pub estimate: usize,
    /// Number of non-empty leaves scanned.
    pub cells_visited: usize,
    /// Number of points within the radius.
    pub match_count: usize,
    /// Matches ordered by ascending distance.
    pub entities: Vec<Match>,
}

/// Pagination and cost controls for [`crate::GeoStore::query`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOptions {
    /// Page size; `None` returns every match.
    #[serde(default)]
    pub count: Option<usize>,
    #[serde(default)]
    pub offset: usize,
    /// Abort before scanning when the candidate estimate exceeds this.
    #[serde(default)]
    pub limit: Option<usize>,
}

impl QueryOptions {
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Slice `entities` to the requested page. Out-of-range pages are empty.
    pub(crate) fn page<'a>(&self, entities: &'a [Match]) -> &'a [Match] {
        let start = self.offset.min(entities.len());
        let end = match self.count {
            Some(count) => start.saturating_add(count).min(entities.len()),
            None => entities.len(),
        };
        &entities[start..end]
    }
}

/// Response document returned by the store, echoing the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub request_x: f64,
    pub request_y: f64,
    #[serde(rename = "requestR")]
    pub request_r: f64,
    pub count: Option<usize>,
    pub offset: usize,
    pub cache_hit: bool,
    pub estimate: usize,
    pub cells_visited: usize,
    /// Total matches before pagination.
    pub match_count: usize,
    /// The requested page of matches.
    pub entities: Vec<Match>,
}

/// Descriptor of one quadtree cell, for visualization and debugging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CellInfo {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub xp: f64,
    pub yp: f64,
    pub level: u32,
    pub entity_count: usize,
    pub size: f64,
    pub is_leaf: bool,
}

/// Store-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub points: usize,
    pub cells: usize,
    pub depth: u32,
    pub cached_results: usize,
}
