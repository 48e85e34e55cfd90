//! `storefinder` - Store-location reachability search
//!
//! This library geocodes a free-text address, computes the area reachable
//! within a travel-time budget via a routing provider, and filters the known
//! store locations down to those inside the reachable area.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod filter;
pub mod flow;
pub mod geocode;
pub mod http;
pub mod models;
pub mod reachability;
pub mod repository;
pub mod web;

// Re-export core types for public API
pub use cache::PersistentCache;
pub use config::StoreFinderConfig;
pub use error::StoreFinderError;
pub use filter::filter_within;
pub use flow::{NearbyQuery, NearbySearch};
pub use geocode::{AddressResolver, GeocodingClient};
pub use models::{
    Coordinate, NearbyResult, ReachabilityPolygon, StoreLocation, TimeBudget, TravelProfile,
    WeeklyHours,
};
pub use reachability::{ReachabilityClient, ReachabilityProvider};
pub use repository::{CachedLocationProvider, CsvLocationProvider, LocationProvider};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, StoreFinderError>;
