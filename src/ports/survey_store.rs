//! Survey store port for per-contact health assessments.

use async_trait::async_trait;

use super::opinion_store::StoreError;
use crate::domain::survey::HealthAssessment;

/// Port for persisting and retrieving health assessments keyed by contact.
#[async_trait]
pub trait SurveyStore: Send + Sync {
    /// The most recent assessment recorded for the contact, if any.
    async fn latest_health(&self, contact: &str) -> Result<Option<HealthAssessment>, StoreError>;

    /// Appends a new assessment for the contact.
    async fn record_health(
        &self,
        contact: &str,
        health: &HealthAssessment,
    ) -> Result<(), StoreError>;
}
