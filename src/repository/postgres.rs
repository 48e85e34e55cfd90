//! Postgres-backed location provider
//!
//! The connection pool is created once at startup and injected, so repeated
//! queries reuse the same connections for the process lifetime.

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use tracing::info;

use super::{LocationProvider, LocationRow, rows_to_locations};
use crate::Result;
use crate::error::StoreFinderError;
use crate::models::StoreLocation;

/// The repository query; the whole table, no filtering pushed down
const LOCATIONS_QUERY: &str =
    "SELECT placekey, latitude, longitude, street_address, open_hours FROM core_poi";

pub struct PgLocationProvider {
    pool: PgPool,
}

impl PgLocationProvider {
    /// Wrap an already-connected pool
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a new pool to the given database URL
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPool::connect(database_url).await.map_err(|e| {
            StoreFinderError::repository(format!("Failed to connect to database: {e}"))
        })?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl LocationProvider for PgLocationProvider {
    async fn fetch_all_locations(&self) -> Result<Vec<StoreLocation>> {
        info!("Querying location repository");

        let rows: Vec<LocationRow> = sqlx::query_as(LOCATIONS_QUERY)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreFinderError::repository(format!("Location query failed: {e}")))?;

        rows_to_locations(rows)
    }
}
