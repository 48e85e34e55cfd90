//! Location repository
//!
//! Supplies the full set of known store locations for a query. Sources
//! implement [`LocationProvider`]; the flow never filters at the source —
//! the whole set is fetched and filtering happens downstream.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::Result;
use crate::cache::PersistentCache;
use crate::error::StoreFinderError;
use crate::models::{Coordinate, StoreLocation, WeeklyHours};

pub mod postgres;

/// Cache key for the repository snapshot
const SNAPSHOT_KEY: &str = "locations:all";

/// A source of store locations
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Fetch every known location. No filtering is pushed down.
    async fn fetch_all_locations(&self) -> Result<Vec<StoreLocation>>;
}

/// One row of the repository's location table.
///
/// `open_hours` carries the JSON-encoded weekly hours, or nothing when the
/// store's hours are unknown.
#[derive(Debug, Deserialize, sqlx::FromRow)]
struct LocationRow {
    placekey: String,
    latitude: f64,
    longitude: f64,
    street_address: String,
    open_hours: Option<String>,
}

impl LocationRow {
    fn into_location(self) -> Result<StoreLocation> {
        let open_hours = match self.open_hours.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(WeeklyHours::parse(raw)?),
        };
        Ok(StoreLocation {
            placekey: self.placekey,
            coordinate: Coordinate::new(self.longitude, self.latitude),
            street_address: self.street_address,
            open_hours,
        })
    }
}

/// Converts raw rows, skipping (and counting) rows that fail to decode
fn rows_to_locations(rows: Vec<LocationRow>) -> Result<Vec<StoreLocation>> {
    let mut locations = Vec::with_capacity(rows.len());
    let mut decode_errors = 0;

    for row in rows {
        let placekey = row.placekey.clone();
        match row.into_location() {
            Ok(location) => locations.push(location),
            Err(e) => {
                warn!("Failed to decode location {}: {}", placekey, e);
                decode_errors += 1;
            }
        }
    }

    if locations.is_empty() && decode_errors > 0 {
        return Err(StoreFinderError::repository(
            "No valid locations could be decoded from the repository",
        ));
    }

    info!(
        "Loaded {} locations ({} decode errors)",
        locations.len(),
        decode_errors
    );
    Ok(locations)
}

/// File-backed provider reading a CSV export of the locations table
pub struct CsvLocationProvider {
    path: PathBuf,
}

impl CsvLocationProvider {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl LocationProvider for CsvLocationProvider {
    async fn fetch_all_locations(&self) -> Result<Vec<StoreLocation>> {
        info!("Loading locations from CSV file: {:?}", self.path);

        if !self.path.exists() {
            return Err(StoreFinderError::repository(format!(
                "Locations file not found: {}",
                self.path.display()
            )));
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| {
            StoreFinderError::repository(format!("Failed to open locations file: {e}"))
        })?;

        let mut rows = Vec::new();
        for record in reader.deserialize::<LocationRow>() {
            match record {
                Ok(row) => rows.push(row),
                Err(e) => warn!("Skipping unreadable CSV record: {}", e),
            }
        }

        rows_to_locations(rows)
    }
}

/// Caching wrapper so repeated queries inside the TTL window reuse one
/// repository snapshot instead of re-querying the source.
pub struct CachedLocationProvider {
    inner: Box<dyn LocationProvider>,
    cache: PersistentCache,
    ttl: Duration,
}

impl CachedLocationProvider {
    #[must_use]
    pub fn new(inner: Box<dyn LocationProvider>, cache: PersistentCache, ttl: Duration) -> Self {
        Self { inner, cache, ttl }
    }
}

#[async_trait]
impl LocationProvider for CachedLocationProvider {
    async fn fetch_all_locations(&self) -> Result<Vec<StoreLocation>> {
        match self.cache.get::<Vec<StoreLocation>>(SNAPSHOT_KEY).await {
            Ok(Some(locations)) => {
                debug!("Repository snapshot served from cache");
                return Ok(locations);
            }
            Ok(None) => {}
            Err(e) => warn!("Snapshot cache read failed, falling through: {}", e),
        }

        let locations = self.inner.fetch_all_locations().await?;

        if let Err(e) = self
            .cache
            .put(SNAPSHOT_KEY, locations.clone(), self.ttl)
            .await
        {
            warn!("Snapshot cache write failed: {}", e);
        }

        Ok(locations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_csv_provider_loads_rows() {
        let file = write_csv(
            "placekey,latitude,longitude,street_address,open_hours\n\
             zzw-222@abc,40.7318,-73.9975,\"19 Washington Square N\",\"{\"\"Mon\"\":[[\"\"09:00\"\",\"\"17:00\"\"]]}\"\n\
             zzw-223@abd,40.7411,-73.9897,\"200 5th Ave\",\n",
        );

        let provider = CsvLocationProvider::new(file.path());
        let locations = provider.fetch_all_locations().await.unwrap();

        assert_eq!(locations.len(), 2);
        assert_eq!(locations[0].placekey, "zzw-222@abc");
        assert_eq!(locations[0].coordinate.latitude, 40.7318);
        assert_eq!(locations[0].coordinate.longitude, -73.9975);
        assert!(
            locations[0]
                .formatted_open_hours()
                .contains("Mon: 09:00 - 17:00")
        );
        assert!(locations[1].open_hours.is_none());
        assert_eq!(locations[1].formatted_open_hours(), "");
    }

    #[tokio::test]
    async fn test_csv_provider_missing_file() {
        let provider = CsvLocationProvider::new("no_such_locations.csv");
        let result = provider.fetch_all_locations().await;
        assert!(matches!(
            result.unwrap_err(),
            StoreFinderError::Repository { .. }
        ));
    }

    #[tokio::test]
    async fn test_csv_provider_skips_bad_hours() {
        let file = write_csv(
            "placekey,latitude,longitude,street_address,open_hours\n\
             good@key,40.0,-73.0,\"1 Main St\",\n\
             bad@key,41.0,-74.0,\"2 Main St\",\"not json\"\n",
        );

        let provider = CsvLocationProvider::new(file.path());
        let locations = provider.fetch_all_locations().await.unwrap();

        assert_eq!(locations.len(), 1);
        assert_eq!(locations[0].placekey, "good@key");
    }

    #[tokio::test]
    async fn test_cached_provider_serves_snapshot() {
        let file = write_csv(
            "placekey,latitude,longitude,street_address,open_hours\n\
             one@key,40.0,-73.0,\"1 Main St\",\n",
        );
        let dir = tempfile::tempdir().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        let provider = CachedLocationProvider::new(
            Box::new(CsvLocationProvider::new(file.path())),
            cache,
            Duration::from_secs(600),
        );

        let first = provider.fetch_all_locations().await.unwrap();
        assert_eq!(first.len(), 1);

        // The snapshot must survive the source disappearing.
        drop(file);
        let second = provider.fetch_all_locations().await.unwrap();
        assert_eq!(second, first);
    }
}
