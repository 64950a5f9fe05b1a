//! The persisted opinion record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Geographic coordinates resolved from a form's place text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a new coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A finalized piece of civic feedback, ready for the record store.
///
/// Created once per completed form by the commit pipeline; owned by the
/// store thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpinionRecord {
    /// Freshly generated identifier.
    pub id: Uuid,
    /// Contact address of the resident who raised the feedback.
    pub contact: String,
    /// Full description of the matter.
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    /// When the record was committed.
    pub created_at: DateTime<Utc>,
}

impl OpinionRecord {
    /// Creates a new record with a fresh id and the current timestamp.
    pub fn new(
        contact: impl Into<String>,
        description: impl Into<String>,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            contact: contact.into(),
            description: description.into(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            created_at: Utc::now(),
        }
    }
}
