//! Nearby-Location Filter
//!
//! Pure containment filtering of store locations against the reachable-area
//! polygons. Each test is independent and read-only over shared immutable
//! input, so the location set is scanned in parallel.

use geo::{Intersects, Point, Validation};
use rayon::prelude::*;
use tracing::debug;

use crate::Result;
use crate::error::StoreFinderError;
use crate::models::{ReachabilityPolygon, StoreLocation};

/// Return the locations whose coordinate falls within at least one polygon.
///
/// Containment is boundary-inclusive: a point exactly on a polygon edge
/// counts as contained (`geo`'s `Contains` excludes the boundary, so the
/// test uses `Intersects`). An empty polygon set yields an empty result.
/// Result order is not meaningful.
///
/// Malformed polygons (fewer than 3 vertices, self-intersecting rings) are a
/// contract violation and fail the whole request with `InvalidGeometry`.
pub fn filter_within(
    locations: &[StoreLocation],
    polygons: &[ReachabilityPolygon],
) -> Result<Vec<StoreLocation>> {
    if polygons.is_empty() {
        return Ok(Vec::new());
    }

    let rings = validated_rings(polygons)?;

    let matches: Vec<StoreLocation> = locations
        .par_iter()
        .filter(|location| {
            let point = Point::new(
                location.coordinate.longitude,
                location.coordinate.latitude,
            );
            rings.iter().any(|ring| ring.intersects(&point))
        })
        .cloned()
        .collect();

    debug!(
        "{} of {} locations fall within the reachable area",
        matches.len(),
        locations.len()
    );

    Ok(matches)
}

/// Convert and validate every polygon before any containment test runs
fn validated_rings(polygons: &[ReachabilityPolygon]) -> Result<Vec<geo::Polygon<f64>>> {
    polygons
        .iter()
        .map(|polygon| {
            if polygon.ring().len() < 3 {
                return Err(StoreFinderError::invalid_geometry(format!(
                    "Polygon ring has {} vertices, need at least 3",
                    polygon.ring().len()
                )));
            }

            let ring = polygon.to_geo_polygon();
            if !ring.is_valid() {
                return Err(StoreFinderError::invalid_geometry(
                    "Polygon ring is not a valid simple ring",
                ));
            }

            Ok(ring)
        })
        .collect()
}
