//! Geocoding configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Geocoding configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the Nominatim-compatible instance
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl GeocodingConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate geocoding configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidGeocoderUrl);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("civic-scribe/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    10
}
