//! The nearby-location request flow
//!
//! One user query moves through validation, geocoding, reachability and
//! filtering in sequence; each step depends on the previous step's output.
//! The first failure is terminal for the query and nothing is re-run
//! automatically; the user must resubmit.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::Result;
use crate::error::StoreFinderError;
use crate::filter::filter_within;
use crate::geocode::AddressResolver;
use crate::models::{NearbyResult, TimeBudget, TravelProfile};
use crate::reachability::ReachabilityProvider;
use crate::repository::LocationProvider;

/// Minimum accepted address length; shorter input is rejected before any
/// provider call is made
pub const MIN_ADDRESS_LEN: usize = 5;

/// One user submission: address text, travel mode and time budget
#[derive(Debug, Clone)]
pub struct NearbyQuery {
    pub address: String,
    pub profile: TravelProfile,
    pub minutes: TimeBudget,
}

/// The nearby-location search service.
///
/// Providers are injected so the flow can be exercised against in-memory
/// implementations in tests.
pub struct NearbySearch {
    resolver: Arc<dyn AddressResolver>,
    reachability: Arc<dyn ReachabilityProvider>,
    repository: Arc<dyn LocationProvider>,
}

impl NearbySearch {
    #[must_use]
    pub fn new(
        resolver: Arc<dyn AddressResolver>,
        reachability: Arc<dyn ReachabilityProvider>,
        repository: Arc<dyn LocationProvider>,
    ) -> Self {
        Self {
            resolver,
            reachability,
            repository,
        }
    }

    /// Run one query to completion.
    ///
    /// An empty reachable area is a valid zero-match result, not an error.
    #[instrument(skip(self, query), fields(profile = ?query.profile, minutes = query.minutes.minutes()))]
    pub async fn run(&self, query: &NearbyQuery) -> Result<NearbyResult> {
        validate_address(&query.address)?;

        let origin = self.resolver.resolve(&query.address).await?;
        info!("Origin resolved to ({:.4}, {:.4})", origin.latitude, origin.longitude);

        let polygons = self
            .reachability
            .compute_reachable(origin, query.profile, query.minutes)
            .await?;

        let locations = self.repository.fetch_all_locations().await?;
        let matches = filter_within(&locations, &polygons)?;

        info!(
            "Query ready: {} of {} locations reachable",
            matches.len(),
            locations.len()
        );

        Ok(NearbyResult {
            origin,
            polygons,
            matches,
        })
    }
}

/// Reject addresses below the minimal length before any external call
fn validate_address(address: &str) -> Result<()> {
    if address.chars().count() < MIN_ADDRESS_LEN {
        return Err(StoreFinderError::invalid_input(format!(
            "Address must be at least {MIN_ADDRESS_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_address_length() {
        assert!(validate_address("19 Washington Square N").is_ok());
        assert!(validate_address("12345").is_ok());
        assert!(matches!(
            validate_address("1234").unwrap_err(),
            StoreFinderError::InvalidInput { .. }
        ));
        assert!(validate_address("").is_err());
    }
}
