//! Travel profiles, time budgets and reachability results

use serde::{Deserialize, Serialize};

use crate::error::StoreFinderError;
use crate::models::{Coordinate, StoreLocation};

/// Travel mode for the reachability computation
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum TravelProfile {
    Walk,
    Drive,
    Cycle,
}

impl TravelProfile {
    /// The routing provider's profile identifier
    #[must_use]
    pub fn provider_profile(&self) -> &'static str {
        match self {
            TravelProfile::Walk => "foot-walking",
            TravelProfile::Drive => "driving-car",
            TravelProfile::Cycle => "cycling-regular",
        }
    }
}

/// Allowed time budgets, in minutes
pub const ALLOWED_MINUTES: [u32; 3] = [5, 10, 15];

/// Travel-time budget, restricted to a fixed set of values.
///
/// This is a configuration enumeration, not free input; construction outside
/// the allowed set fails.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(try_from = "u32", into = "u32")]
pub struct TimeBudget(u32);

impl TimeBudget {
    /// The budget in minutes
    #[must_use]
    pub fn minutes(&self) -> u32 {
        self.0
    }

    /// The budget in seconds, the routing provider's range unit
    #[must_use]
    pub fn as_seconds(&self) -> u32 {
        self.0 * 60
    }
}

impl TryFrom<u32> for TimeBudget {
    type Error = StoreFinderError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        if ALLOWED_MINUTES.contains(&minutes) {
            Ok(TimeBudget(minutes))
        } else {
            Err(StoreFinderError::invalid_input(format!(
                "Time budget must be one of {ALLOWED_MINUTES:?} minutes, got: {minutes}"
            )))
        }
    }
}

impl From<TimeBudget> for u32 {
    fn from(budget: TimeBudget) -> Self {
        budget.0
    }
}

/// One connected reachable region, as a closed exterior ring.
///
/// The first vertex implicitly equals the last; the ring is stored without
/// the duplicate closing vertex.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReachabilityPolygon {
    ring: Vec<Coordinate>,
}

impl ReachabilityPolygon {
    /// Build a polygon from a ring of vertices.
    ///
    /// A trailing vertex equal to the first is dropped so the ring is stored
    /// open; closing is re-applied when converting to concrete geometry.
    #[must_use]
    pub fn from_ring(mut ring: Vec<Coordinate>) -> Self {
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        Self { ring }
    }

    /// The ring vertices, without the closing vertex
    #[must_use]
    pub fn ring(&self) -> &[Coordinate] {
        &self.ring
    }

    /// Convert to `geo` polygon for containment tests.
    ///
    /// `geo` coordinates are x/y, which for geographic data is lon/lat.
    #[must_use]
    pub fn to_geo_polygon(&self) -> geo::Polygon<f64> {
        let exterior: Vec<geo::Coord<f64>> = self
            .ring
            .iter()
            .map(|c| geo::Coord {
                x: c.longitude,
                y: c.latitude,
            })
            .collect();
        geo::Polygon::new(geo::LineString::from(exterior), vec![])
    }
}

/// Result of one nearby-location query; built per request, never persisted
#[derive(Debug, Serialize, Clone)]
pub struct NearbyResult {
    /// Geocoded origin of the query
    pub origin: Coordinate,
    /// Reachable area, possibly several disjoint regions, possibly empty
    pub polygons: Vec<ReachabilityPolygon>,
    /// Locations whose coordinate falls within at least one polygon
    pub matches: Vec<StoreLocation>,
}
