use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use storefinder::api::AppState;
use storefinder::cache::PersistentCache;
use storefinder::config::StoreFinderConfig;
use storefinder::flow::NearbySearch;
use storefinder::geocode::GeocodingClient;
use storefinder::reachability::ReachabilityClient;
use storefinder::repository::postgres::PgLocationProvider;
use storefinder::repository::{CachedLocationProvider, CsvLocationProvider, LocationProvider};
use storefinder::web;

#[tokio::main]
async fn main() -> Result<()> {
    let config = StoreFinderConfig::load().context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting storefinder {}", storefinder::VERSION);

    let cache_dir = shellexpand_home(&config.repository.cache_location);
    let cache = PersistentCache::open(&cache_dir)
        .with_context(|| format!("Failed to open cache at {cache_dir}"))?;

    let source: Box<dyn LocationProvider> = match &config.repository.database_url {
        Some(url) => {
            tracing::info!("Using Postgres location repository");
            Box::new(PgLocationProvider::connect(url).await?)
        }
        None => {
            tracing::info!(
                "Using CSV location repository: {}",
                config.repository.locations_file
            );
            Box::new(CsvLocationProvider::new(&config.repository.locations_file))
        }
    };
    let repository: Arc<dyn LocationProvider> = Arc::new(CachedLocationProvider::new(
        source,
        cache,
        Duration::from_secs(config.repository.cache_ttl_seconds),
    ));

    let resolver = Arc::new(GeocodingClient::new(&config.geocoding)?);
    let reachability = Arc::new(ReachabilityClient::new(&config.reachability)?);
    let search = Arc::new(NearbySearch::new(resolver, reachability, repository.clone()));

    web::run(config.server.port, AppState { search, repository }).await
}

/// Expand a leading `~` to the home directory
fn shellexpand_home(path: &str) -> String {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest).to_string_lossy().into_owned(),
        _ => path.to_string(),
    }
}
