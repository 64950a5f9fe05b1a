//! Adapters - implementations of the ports plus the HTTP surface.

pub mod ai;
pub mod geocoding;
pub mod http;
pub mod store;
