//! Store location and coordinate models

use serde::{Deserialize, Serialize};

use crate::models::WeeklyHours;

/// A geographic coordinate in decimal degrees.
///
/// Longitude-first field order is deliberate: every external interface this
/// application talks to (GeoJSON rings, isochrone requests, map layers) is
/// longitude-first, and a bare `(f64, f64)` pair never crosses a module
/// boundary. Conversion to a provider's ordering happens at the wire.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Latitude in decimal degrees
    pub latitude: f64,
}

impl Coordinate {
    /// Create a new coordinate
    #[must_use]
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Format as a `lat, lon` display string
    #[must_use]
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }

    /// The `[lon, lat]` pair used by GeoJSON-shaped interfaces
    #[must_use]
    pub fn lon_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

/// A known store location, immutable once loaded for a session
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoreLocation {
    /// Unique location key
    pub placekey: String,
    /// Geographic position
    pub coordinate: Coordinate,
    /// Street address for display
    pub street_address: String,
    /// Weekly opening hours; `None` when the repository column is null
    pub open_hours: Option<WeeklyHours>,
}

impl StoreLocation {
    /// Opening hours formatted for display; empty string when unknown
    #[must_use]
    pub fn formatted_open_hours(&self) -> String {
        self.open_hours
            .as_ref()
            .map(WeeklyHours::format)
            .unwrap_or_default()
    }
}
