use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::error::StoreFinderError;
use crate::flow::{NearbyQuery, NearbySearch};
use crate::models::{NearbyResult, StoreLocation, TimeBudget, TravelProfile};
use crate::repository::LocationProvider;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub search: Arc<NearbySearch>,
    pub repository: Arc<dyn LocationProvider>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiStoreLocation {
    pub placekey: String,
    pub latitude: f64,
    pub longitude: f64,
    pub street_address: String,
    /// Display-formatted weekly hours; empty when unknown
    pub open_hours: String,
}

impl From<&StoreLocation> for ApiStoreLocation {
    fn from(location: &StoreLocation) -> Self {
        Self {
            placekey: location.placekey.clone(),
            latitude: location.coordinate.latitude,
            longitude: location.coordinate.longitude,
            street_address: location.street_address.clone(),
            open_hours: location.formatted_open_hours(),
        }
    }
}

#[derive(Deserialize)]
pub struct ApiNearbyRequest {
    pub address: String,
    pub profile: TravelProfile,
    pub minutes: TimeBudget,
}

/// Query result shaped for the map frontend: closed `[lon, lat]` rings
#[derive(Serialize)]
pub struct ApiNearbyResponse {
    pub origin: [f64; 2],
    pub polygons: Vec<Vec<[f64; 2]>>,
    pub matches: Vec<ApiStoreLocation>,
}

impl From<&NearbyResult> for ApiNearbyResponse {
    fn from(result: &NearbyResult) -> Self {
        Self {
            origin: result.origin.lon_lat(),
            polygons: result
                .polygons
                .iter()
                .map(|polygon| {
                    let mut ring: Vec<[f64; 2]> =
                        polygon.ring().iter().map(|c| c.lon_lat()).collect();
                    if let Some(&first) = ring.first() {
                        ring.push(first);
                    }
                    ring
                })
                .collect(),
            matches: result.matches.iter().map(ApiStoreLocation::from).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

fn error_response(err: &StoreFinderError) -> (StatusCode, Json<ApiErrorBody>) {
    let status = match err {
        StoreFinderError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
        StoreFinderError::AddressNotFound { .. } => StatusCode::NOT_FOUND,
        StoreFinderError::ReachabilityUnavailable { .. } => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ApiErrorBody {
            error: err.user_message(),
        }),
    )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/locations", get(get_locations))
        .route("/nearby", post(post_nearby))
        .with_state(state)
}

async fn get_locations(
    State(state): State<AppState>,
) -> Result<Json<Vec<ApiStoreLocation>>, (StatusCode, Json<ApiErrorBody>)> {
    let locations = state
        .repository
        .fetch_all_locations()
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(locations.iter().map(ApiStoreLocation::from).collect()))
}

async fn post_nearby(
    State(state): State<AppState>,
    Json(request): Json<ApiNearbyRequest>,
) -> Result<Json<ApiNearbyResponse>, (StatusCode, Json<ApiErrorBody>)> {
    let query = NearbyQuery {
        address: request.address,
        profile: request.profile,
        minutes: request.minutes,
    };
    let result = state
        .search
        .run(&query)
        .await
        .map_err(|e| error_response(&e))?;
    Ok(Json(ApiNearbyResponse::from(&result)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinate, ReachabilityPolygon};

    #[test]
    fn test_api_location_carries_formatted_hours() {
        let location = StoreLocation {
            placekey: "zzw-222@abc".to_string(),
            coordinate: Coordinate::new(-73.9975, 40.7318),
            street_address: "19 Washington Square N".to_string(),
            open_hours: Some(
                crate::models::WeeklyHours::parse(r#"{"Mon":[["09:00","17:00"]]}"#).unwrap(),
            ),
        };
        let api: ApiStoreLocation = (&location).into();
        assert_eq!(api.longitude, -73.9975);
        assert!(api.open_hours.contains("Mon: 09:00 - 17:00"));
    }

    #[test]
    fn test_api_response_closes_rings() {
        let result = NearbyResult {
            origin: Coordinate::new(-74.0, 40.7),
            polygons: vec![ReachabilityPolygon::from_ring(vec![
                Coordinate::new(-74.0, 40.7),
                Coordinate::new(-73.9, 40.7),
                Coordinate::new(-73.9, 40.8),
            ])],
            matches: vec![],
        };
        let api = ApiNearbyResponse::from(&result);
        assert_eq!(api.origin, [-74.0, 40.7]);
        let ring = &api.polygons[0];
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_error_status_mapping() {
        let (status, _) = error_response(&StoreFinderError::invalid_input("too short"));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = error_response(&StoreFinderError::address_not_found("no match"));
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) =
            error_response(&StoreFinderError::reachability_unavailable("HTTP 429"));
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, _) = error_response(&StoreFinderError::invalid_geometry("bad ring"));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_nearby_request_deserializes() {
        let request: ApiNearbyRequest = serde_json::from_str(
            r#"{"address": "19 Washington Square N", "profile": "Walk", "minutes": 10}"#,
        )
        .unwrap();
        assert_eq!(request.profile, TravelProfile::Walk);
        assert_eq!(request.minutes.as_seconds(), 600);
    }
}
