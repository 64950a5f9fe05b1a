//! Completion-triggered commit pipeline.
//!
//! Resolves the completed form's place to coordinates and persists the
//! final record. Every failure on this path is logged and swallowed: the
//! resident still sees a completed conversation, the record simply does
//! not exist.

use std::sync::Arc;

use crate::domain::feedback::FeedbackForm;
use crate::domain::opinion::OpinionRecord;
use crate::ports::{Geocoder, OpinionStore};

/// Geocode-then-persist pipeline for completed forms.
pub struct CommitPipeline {
    geocoder: Arc<dyn Geocoder>,
    store: Arc<dyn OpinionStore>,
}

impl CommitPipeline {
    /// Creates a new pipeline over the given gateways.
    pub fn new(geocoder: Arc<dyn Geocoder>, store: Arc<dyn OpinionStore>) -> Self {
        Self { geocoder, store }
    }

    /// Commits one completed form. Single attempt, no retry.
    ///
    /// Never returns an error; failures are emitted as tracing events so
    /// the enclosing turn's outcome is unaffected.
    pub async fn run(&self, contact: &str, form: &FeedbackForm) {
        let (Some(description), Some(place)) = (form.description.as_deref(), form.place.as_deref())
        else {
            tracing::error!("commit pipeline invoked with an incomplete form");
            return;
        };

        let coordinates = match self.geocoder.resolve(place).await {
            Ok(Some(coordinates)) => coordinates,
            Ok(None) => {
                tracing::warn!(place, "place did not resolve to coordinates; record not persisted");
                return;
            }
            Err(err) => {
                tracing::warn!(place, error = %err, "geocoding failed; record not persisted");
                return;
            }
        };

        let record = OpinionRecord::new(contact, description, coordinates);
        if let Err(err) = self.store.put(&record).await {
            tracing::error!(
                record_id = %record.id,
                error = %err,
                "failed to persist opinion record"
            );
        } else {
            tracing::info!(record_id = %record.id, "opinion record persisted");
        }
    }
}
