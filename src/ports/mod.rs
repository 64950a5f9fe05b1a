//! Ports - interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application core and the outside world. Adapters implement them.
//!
//! - `ChatModel` - the language-model gateway
//! - `Geocoder` - place text to coordinates
//! - `OpinionStore` - persistence for finalized feedback records
//! - `SurveyStore` - persistence for per-contact health assessments

mod chat_model;
mod geocoder;
mod opinion_store;
mod survey_store;

pub use chat_model::{ChatModel, ModelError, ModelReply};
pub use geocoder::{GeocodeError, Geocoder};
pub use opinion_store::{OpinionStore, StoreError};
pub use survey_store::SurveyStore;
