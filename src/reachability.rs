//! Reachability Service
//!
//! Computes the area reachable from an origin within a time budget by
//! requesting an isochrone from the OpenRouteService API. Provider errors
//! (quota, transient failures, malformed responses) are terminal for the
//! query; nothing is retried beyond the transport-level backoff.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::config::ReachabilityConfig;
use crate::error::StoreFinderError;
use crate::http::build_client;
use crate::models::{Coordinate, ReachabilityPolygon, TimeBudget, TravelProfile};

/// Computes the reachable area around an origin
#[async_trait]
pub trait ReachabilityProvider: Send + Sync {
    /// Compute the reachable polygons. An empty result is valid: an origin
    /// with no reachable network edges within the budget yields no polygons.
    async fn compute_reachable(
        &self,
        origin: Coordinate,
        profile: TravelProfile,
        budget: TimeBudget,
    ) -> Result<Vec<ReachabilityPolygon>>;
}

/// Isochrone request body.
///
/// The provider's range unit is seconds; a single range value requests one
/// time band covering `[0, budget]` rather than a multi-ring isochrone.
#[derive(Debug, Serialize, PartialEq)]
struct IsochroneRequest {
    locations: Vec<[f64; 2]>,
    range: Vec<u32>,
    range_type: &'static str,
    location_type: &'static str,
}

impl IsochroneRequest {
    fn new(origin: Coordinate, budget: TimeBudget) -> Self {
        Self {
            locations: vec![origin.lon_lat()],
            range: vec![budget.as_seconds()],
            range_type: "time",
            location_type: "start",
        }
    }
}

/// OpenRouteService-backed reachability provider
pub struct ReachabilityClient {
    http: ClientWithMiddleware,
    base_url: String,
    api_key: String,
}

impl ReachabilityClient {
    /// Create a new reachability client
    pub fn new(config: &ReachabilityConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| StoreFinderError::config("Routing API key is required"))?;
        let http = build_client("storefinder/0.1.0", config.timeout_seconds, config.max_retries)?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl ReachabilityProvider for ReachabilityClient {
    #[instrument(skip(self), fields(profile = profile.provider_profile(), minutes = budget.minutes()))]
    async fn compute_reachable(
        &self,
        origin: Coordinate,
        profile: TravelProfile,
        budget: TimeBudget,
    ) -> Result<Vec<ReachabilityPolygon>> {
        let url = format!(
            "{}/v2/isochrones/{}",
            self.base_url,
            profile.provider_profile()
        );
        let request = IsochroneRequest::new(origin, budget);

        debug!("Requesting isochrone from {}", url);

        let response = self
            .http
            .post(&url)
            .header("Authorization", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                StoreFinderError::reachability_unavailable(format!(
                    "Isochrone request failed: {e}"
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreFinderError::reachability_unavailable(format!(
                "Isochrone service returned HTTP {status}"
            )));
        }

        let collection: openrouteservice::FeatureCollection =
            response.json().await.map_err(|e| {
                StoreFinderError::reachability_unavailable(format!(
                    "Invalid isochrone response: {e}"
                ))
            })?;

        let polygons = feature_polygons(collection);
        if polygons.is_empty() {
            warn!("Isochrone response contained no reachable area");
        } else {
            info!("Reachable area has {} polygon(s)", polygons.len());
        }

        Ok(polygons)
    }
}

/// Convert the first feature's geometry rings into reachability polygons.
///
/// Each ring becomes its own polygon; matching downstream is a logical OR
/// across rings. Zero features means an empty reachable area, not an error.
fn feature_polygons(collection: openrouteservice::FeatureCollection) -> Vec<ReachabilityPolygon> {
    let Some(feature) = collection.features.into_iter().next() else {
        return Vec::new();
    };

    feature
        .geometry
        .coordinates
        .into_iter()
        .map(|ring| {
            ReachabilityPolygon::from_ring(
                ring.into_iter()
                    .map(|[lon, lat]| Coordinate::new(lon, lat))
                    .collect(),
            )
        })
        .collect()
}

/// OpenRouteService API response structures
mod openrouteservice {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct FeatureCollection {
        #[serde(default)]
        pub features: Vec<Feature>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Feature {
        pub geometry: Geometry,
    }

    /// Polygon geometry: rings of `[lon, lat]` vertices
    #[derive(Debug, Deserialize)]
    pub struct Geometry {
        pub coordinates: Vec<Vec<[f64; 2]>>,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_converts_minutes_to_seconds() {
        let budget = TimeBudget::try_from(10).unwrap();
        let request = IsochroneRequest::new(Coordinate::new(-73.9975, 40.7318), budget);
        assert_eq!(request.range, vec![600]);
        assert_eq!(request.range_type, "time");
    }

    #[test]
    fn test_request_is_longitude_first() {
        let budget = TimeBudget::try_from(5).unwrap();
        let request = IsochroneRequest::new(Coordinate::new(-73.9975, 40.7318), budget);
        assert_eq!(request.locations, vec![[-73.9975, 40.7318]]);
    }

    #[test]
    fn test_request_body_shape() {
        let budget = TimeBudget::try_from(15).unwrap();
        let request = IsochroneRequest::new(Coordinate::new(8.0, 46.0), budget);
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["range"], serde_json::json!([900]));
        assert_eq!(body["location_type"], "start");
    }

    #[test]
    fn test_feature_polygons_one_ring_per_polygon() {
        let collection: openrouteservice::FeatureCollection = serde_json::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [
                            [[-74.0, 40.7], [-73.9, 40.7], [-73.9, 40.8], [-74.0, 40.7]],
                            [[-74.2, 40.9], [-74.1, 40.9], [-74.1, 41.0], [-74.2, 40.9]]
                        ]
                    }
                }]
            }"#,
        )
        .unwrap();

        let polygons = feature_polygons(collection);
        assert_eq!(polygons.len(), 2);
        let first = polygons[0].ring().first().unwrap();
        assert_eq!(first.longitude, -74.0);
        assert_eq!(first.latitude, 40.7);
    }

    #[test]
    fn test_feature_polygons_empty_collection() {
        let collection: openrouteservice::FeatureCollection =
            serde_json::from_str(r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        assert!(feature_polygons(collection).is_empty());
    }
}
