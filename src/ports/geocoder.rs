//! Geocoding gateway port.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::opinion::Coordinates;

/// Port for resolving free-text place descriptions to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves place text to coordinates.
    ///
    /// Returns `Ok(None)` when the place text is ambiguous or unknown to
    /// the backend; errors are reserved for transport-level failures.
    async fn resolve(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError>;
}

/// Geocoding gateway errors.
#[derive(Debug, Clone, Error)]
pub enum GeocodeError {
    /// Backend is unavailable.
    #[error("geocoder unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the backend response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },
}

impl GeocodeError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
