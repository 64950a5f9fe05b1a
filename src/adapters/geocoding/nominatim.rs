//! Nominatim adapter - Geocoder implementation over the OSM search API.
//!
//! Issues a single free-text search per place and takes the top hit. An
//! empty result set is a miss (`Ok(None)`), not an error.
//!
//! # Configuration
//!
//! ```ignore
//! let config = NominatimConfig::default()
//!     .with_base_url("https://nominatim.example.org");
//!
//! let geocoder = NominatimGeocoder::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Deserialize;
use std::time::Duration;

use crate::domain::opinion::Coordinates;
use crate::ports::{GeocodeError, Geocoder};

/// Configuration for the Nominatim adapter.
#[derive(Debug, Clone)]
pub struct NominatimConfig {
    /// Base URL of the Nominatim instance.
    pub base_url: String,
    /// User-Agent header; public Nominatim instances require one.
    pub user_agent: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl NominatimConfig {
    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: format!("civic-scribe/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Nominatim Geocoder implementation.
pub struct NominatimGeocoder {
    config: NominatimConfig,
    client: Client,
}

impl NominatimGeocoder {
    /// Creates a new adapter with the given configuration.
    pub fn new(config: NominatimConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the search endpoint URL.
    fn search_url(&self) -> String {
        format!("{}/search", self.config.base_url)
    }

    async fn handle_response_status(&self, response: Response) -> Result<Response, GeocodeError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        match status.as_u16() {
            500..=599 => Err(GeocodeError::unavailable(format!(
                "Server error {}: {}",
                status, error_body
            ))),
            _ => Err(GeocodeError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn resolve(&self, place: &str) -> Result<Option<Coordinates>, GeocodeError> {
        let response = self
            .client
            .get(self.search_url())
            .query(&[("q", place), ("format", "json"), ("limit", "1")])
            .header("User-Agent", &self.config.user_agent)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodeError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    GeocodeError::network(format!("Connection failed: {}", e))
                } else {
                    GeocodeError::network(e.to_string())
                }
            })?;

        let response = self.handle_response_status(response).await?;

        let rows: Vec<SearchRow> = response
            .json()
            .await
            .map_err(|e| GeocodeError::parse(format!("Failed to parse response: {}", e)))?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(row.into_coordinates()?)),
            None => Ok(None),
        }
    }
}

/// One row of a Nominatim search result. Coordinates arrive as strings.
#[derive(Debug, Deserialize)]
struct SearchRow {
    lat: String,
    lon: String,
}

impl SearchRow {
    fn into_coordinates(self) -> Result<Coordinates, GeocodeError> {
        let latitude = self
            .lat
            .parse::<f64>()
            .map_err(|e| GeocodeError::parse(format!("bad latitude {:?}: {}", self.lat, e)))?;
        let longitude = self
            .lon
            .parse::<f64>()
            .map_err(|e| GeocodeError::parse(format!("bad longitude {:?}: {}", self.lon, e)))?;
        Ok(Coordinates::new(latitude, longitude))
    }
}
