//! Geocoding gateway adapters.
//!
//! - `NominatimGeocoder` - OSM Nominatim-compatible search endpoint
//! - `StaticGeocoder` - configurable stand-in for tests and local runs

mod nominatim;
mod static_geocoder;

pub use nominatim::{NominatimConfig, NominatimGeocoder};
pub use static_geocoder::StaticGeocoder;
