//! Validation for request parameters coming from a boundary layer.
//!
//! The index itself never sees malformed input: a request handler parses its
//! string parameters here first and reports [`GeoStoreError::InvalidInput`]
//! to its own client.

use crate::error::{GeoStoreError, Result};
use crate::types::QueryOptions;
use geo::Point;

/// A parsed and validated radius query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryRequest {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub options: QueryOptions,
}

/// Parses a finite coordinate value.
///
/// # Examples
///
/// ```
/// use geostore::compute::validation::parse_coordinate;
///
/// assert_eq!(parse_coordinate("x", " 12.5 ").unwrap(), 12.5);
/// assert!(parse_coordinate("x", "abc").is_err());
/// assert!(parse_coordinate("x", "inf").is_err());
/// ```
pub fn parse_coordinate(name: &str, raw: &str) -> Result<f64> {
    let value: f64 = raw.trim().parse().map_err(|_| {
        GeoStoreError::InvalidInput(format!("Parameter '{}' is not a number: {:?}", name, raw))
    })?;

    if !value.is_finite() {
        return Err(GeoStoreError::InvalidInput(format!(
            "Parameter '{}' must be finite, got: {}",
            name, value
        )));
    }

    Ok(value)
}

/// Validates that a point has finite coordinates.
pub fn validate_point(point: &Point<f64>) -> Result<()> {
    let (x, y) = (point.x(), point.y());

    if !x.is_finite() {
        return Err(GeoStoreError::InvalidInput(format!(
            "X coordinate must be finite, got: {}",
            x
        )));
    }

    if !y.is_finite() {
        return Err(GeoStoreError::InvalidInput(format!(
            "Y coordinate must be finite, got: {}",
            y
        )));
    }

    Ok(())
}

/// Validates a query radius: finite and not negative.
pub fn validate_radius(radius: f64) -> Result<()> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(GeoStoreError::InvalidInput(format!(
            "Radius must be a finite non-negative number, got: {}",
            radius
        )));
    }
    Ok(())
}

fn parse_count(raw: &str) -> Result<Option<usize>> {
    let value: i64 = raw.trim().parse().map_err(|_| {
        GeoStoreError::InvalidInput(format!("Parameter 'count' is not an integer: {:?}", raw))
    })?;
    match value {
        -1 => Ok(None),
        v if v >= 0 => Ok(Some(v as usize)),
        v => Err(GeoStoreError::InvalidInput(format!(
            "Parameter 'count' must be -1 or non-negative, got: {}",
            v
        ))),
    }
}

fn parse_unsigned(name: &str, raw: &str) -> Result<usize> {
    raw.trim().parse().map_err(|_| {
        GeoStoreError::InvalidInput(format!(
            "Parameter '{}' must be a non-negative integer: {:?}",
            name, raw
        ))
    })
}

/// Builds a [`QueryRequest`] from raw key/value parameters.
///
/// `x`, `y` and `R` (or `r`) are required. `count` defaults to -1 (all
/// matches), `offset` to 0, and `limit` is optional. Unknown keys are
/// ignored.
///
/// # Examples
///
/// ```
/// use geostore::compute::validation::parse_query;
///
/// let request = parse_query([("x", "10"), ("y", "20"), ("R", "5"), ("count", "3")]).unwrap();
/// assert_eq!(request.radius, 5.0);
/// assert_eq!(request.options.count, Some(3));
///
/// assert!(parse_query([("x", "10"), ("R", "5")]).is_err());
/// ```
pub fn parse_query<I, K, V>(params: I) -> Result<QueryRequest>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let (mut x, mut y, mut radius) = (None, None, None);
    let mut options = QueryOptions::default();

    for (key, value) in params {
        let value = value.as_ref();
        match key.as_ref() {
            "x" => x = Some(parse_coordinate("x", value)?),
            "y" => y = Some(parse_coordinate("y", value)?),
            "R" | "r" => radius = Some(parse_coordinate("R", value)?),
            "count" => options.count = parse_count(value)?,
            "offset" => options.offset = parse_unsigned("offset", value)?,
            "limit" => options.limit = Some(parse_unsigned("limit", value)?),
            _ => {}
        }
    }

    let missing = |name: &str| GeoStoreError::InvalidInput(format!("Missing parameter '{}'", name));
    let x = x.ok_or_else(|| missing("x"))?;
    let y = y.ok_or_else(|| missing("y"))?;
    let radius = radius.ok_or_else(|| missing("R"))?;
    validate_radius(radius)?;

    Ok(QueryRequest {
        x,
        y,
        radius,
        options,
    })
}
