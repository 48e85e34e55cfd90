//! Address Resolver
//!
//! Turns free-text address input into a geographic coordinate via the
//! Nominatim search API. The first (best) match wins; no match is a
//! terminal failure for the query.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use tracing::{debug, instrument};

use crate::Result;
use crate::config::GeocodingConfig;
use crate::error::StoreFinderError;
use crate::http::build_client;
use crate::models::Coordinate;

/// Resolves a free-text address to a coordinate
#[async_trait]
pub trait AddressResolver: Send + Sync {
    /// Resolve an address, failing with `AddressNotFound` when the provider
    /// has no match. Callers validate minimal address length before calling.
    async fn resolve(&self, address: &str) -> Result<Coordinate>;
}

/// Nominatim-backed address resolver
pub struct GeocodingClient {
    http: ClientWithMiddleware,
    base_url: String,
}

impl GeocodingClient {
    /// Create a new geocoding client
    pub fn new(config: &GeocodingConfig) -> Result<Self> {
        let http = build_client(
            &config.user_agent,
            config.timeout_seconds,
            config.max_retries,
        )?;
        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }
}

#[async_trait]
impl AddressResolver for GeocodingClient {
    #[instrument(skip(self))]
    async fn resolve(&self, address: &str) -> Result<Coordinate> {
        let url = format!(
            "{}/search?q={}&format=jsonv2&limit=1",
            self.base_url,
            urlencoding::encode(address)
        );

        let response = self.http.get(&url).send().await.map_err(|e| {
            StoreFinderError::address_not_found(format!("Geocoding request failed: {e}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreFinderError::address_not_found(format!(
                "Geocoding service returned HTTP {status}"
            )));
        }

        let places: Vec<nominatim::Place> = response.json().await.map_err(|e| {
            StoreFinderError::address_not_found(format!("Invalid geocoding response: {e}"))
        })?;

        first_match(places, address)
    }
}

/// Pick the best match and convert it to a coordinate
fn first_match(places: Vec<nominatim::Place>, address: &str) -> Result<Coordinate> {
    let place = places.into_iter().next().ok_or_else(|| {
        StoreFinderError::address_not_found(format!("No match for '{address}'"))
    })?;

    // Nominatim returns coordinates as decimal strings
    let longitude = place.lon.parse::<f64>().map_err(|_| {
        StoreFinderError::address_not_found(format!("Invalid longitude: {}", place.lon))
    })?;
    let latitude = place.lat.parse::<f64>().map_err(|_| {
        StoreFinderError::address_not_found(format!("Invalid latitude: {}", place.lat))
    })?;

    debug!(
        "Resolved '{}' to {} ({:.4}, {:.4})",
        address, place.display_name, latitude, longitude
    );

    Ok(Coordinate::new(longitude, latitude))
}

/// Nominatim API response structures
mod nominatim {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct Place {
        pub lat: String,
        pub lon: String,
        pub display_name: String,
    }
}
