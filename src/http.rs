//! Shared HTTP client construction for the provider clients

use std::time::Duration;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};

use crate::Result;
use crate::error::StoreFinderError;

/// Build a client with an explicit timeout and bounded retry with
/// exponential backoff for transient failures.
///
/// Retry exhaustion still surfaces as a terminal failure to the caller; the
/// search flow itself is never re-run automatically.
pub fn build_client(
    user_agent: &str,
    timeout_seconds: u32,
    max_retries: u32,
) -> Result<ClientWithMiddleware> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_seconds.into()))
        .user_agent(user_agent.to_string())
        .build()
        .map_err(|e| StoreFinderError::config(format!("Failed to create HTTP client: {e}")))?;

    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(max_retries);

    Ok(ClientBuilder::new(client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build())
}
