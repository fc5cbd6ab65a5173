//! GeoJSON rendering of the quadtree cell layout.
//!
//! Each cell becomes a `Polygon` feature carrying its level, centroid and
//! point count, so a map client can draw the subdivision directly.

use crate::error::Result;
use crate::types::CellInfo;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

fn cell_feature(cell: &CellInfo) -> Feature {
    let ring = vec![
        vec![cell.x0, cell.y0],
        vec![cell.x1, cell.y0],
        vec![cell.x1, cell.y1],
        vec![cell.x0, cell.y1],
        vec![cell.x0, cell.y0],
    ];

    let mut properties = JsonObject::new();
    properties.insert("level".to_string(), cell.level.into());
    properties.insert("entityCount".to_string(), cell.entity_count.into());
    properties.insert("size".to_string(), cell.size.into());
    properties.insert("isLeaf".to_string(), cell.is_leaf.into());
    properties.insert("centroid".to_string(), vec![cell.xp, cell.yp].into());

    Feature {
        bbox: Some(vec![cell.x0, cell.y0, cell.x1, cell.y1]),
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// One polygon feature per cell, in the order given.
pub fn cells_to_geojson(cells: &[CellInfo]) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: cells.iter().map(cell_feature).collect(),
        foreign_members: None,
    }
}

/// [`cells_to_geojson`] serialized to a string.
pub fn cells_to_geojson_string(cells: &[CellInfo]) -> Result<String> {
    Ok(serde_json::to_string(&cells_to_geojson(cells))?)
}
