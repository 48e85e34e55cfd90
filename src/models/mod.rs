//! Data models for the storefinder application
//!
//! This module contains the core domain models organized by concern:
//! - Location: store locations and geographic coordinates
//! - Hours: weekly opening-hours parsing and display formatting
//! - Nearby: travel profiles, time budgets and reachability results

pub mod hours;
pub mod location;
pub mod nearby;

// Re-export all public types for convenient access
pub use hours::WeeklyHours;
pub use location::{Coordinate, StoreLocation};
pub use nearby::{NearbyResult, ReachabilityPolygon, TimeBudget, TravelProfile};
