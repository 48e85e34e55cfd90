//! Error types and handling for the `storefinder` application

use thiserror::Error;

/// Main error type for the `storefinder` application
#[derive(Error, Debug)]
pub enum StoreFinderError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors, recovered locally before any provider call
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// The geocoding provider had no match (or could not be reached)
    #[error("Address not found: {message}")]
    AddressNotFound { message: String },

    /// The isochrone provider failed (quota, transient error, bad response)
    #[error("Reachability unavailable: {message}")]
    ReachabilityUnavailable { message: String },

    /// Malformed polygon input to the containment filter; a contract
    /// violation, not a user-facing condition
    #[error("Invalid geometry: {message}")]
    InvalidGeometry { message: String },

    /// Location repository errors (query, decode, cache)
    #[error("Repository error: {message}")]
    Repository { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl StoreFinderError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new input validation error
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Create a new address-not-found error
    pub fn address_not_found<S: Into<String>>(message: S) -> Self {
        Self::AddressNotFound {
            message: message.into(),
        }
    }

    /// Create a new reachability error
    pub fn reachability_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ReachabilityUnavailable {
            message: message.into(),
        }
    }

    /// Create a new geometry contract violation
    pub fn invalid_geometry<S: Into<String>>(message: S) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    /// Create a new repository error
    pub fn repository<S: Into<String>>(message: S) -> Self {
        Self::Repository {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            StoreFinderError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            StoreFinderError::InvalidInput { message } => {
                format!("Invalid input: {message}")
            }
            StoreFinderError::AddressNotFound { .. } => "Address not found.".to_string(),
            StoreFinderError::ReachabilityUnavailable { .. } => {
                "Unable to generate the reachable area. Please try again later.".to_string()
            }
            StoreFinderError::InvalidGeometry { .. } => {
                "The reachable area could not be processed.".to_string()
            }
            StoreFinderError::Repository { .. } => {
                "Unable to load store locations. Please try again later.".to_string()
            }
            StoreFinderError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = StoreFinderError::config("missing API key");
        assert!(matches!(config_err, StoreFinderError::Config { .. }));

        let input_err = StoreFinderError::invalid_input("address too short");
        assert!(matches!(input_err, StoreFinderError::InvalidInput { .. }));

        let geo_err = StoreFinderError::invalid_geometry("ring with 2 points");
        assert!(matches!(geo_err, StoreFinderError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_user_messages() {
        let input_err = StoreFinderError::invalid_input("address too short");
        assert!(input_err.user_message().contains("address too short"));

        let not_found = StoreFinderError::address_not_found("no match for 'zzz'");
        assert_eq!(not_found.user_message(), "Address not found.");

        let unavailable = StoreFinderError::reachability_unavailable("HTTP 429");
        assert!(unavailable.user_message().contains("try again later"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: StoreFinderError = io_err.into();
        assert!(matches!(err, StoreFinderError::Io { .. }));
    }
}
