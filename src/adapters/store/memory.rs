//! In-memory store implementations for tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::opinion::OpinionRecord;
use crate::domain::survey::HealthAssessment;
use crate::ports::{OpinionStore, StoreError, SurveyStore};

/// In-memory OpinionStore. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOpinionStore {
    records: Arc<Mutex<Vec<OpinionRecord>>>,
    fail: bool,
}

impl InMemoryOpinionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose writes always fail.
    pub fn failing() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    /// All records persisted so far.
    pub fn records(&self) -> Vec<OpinionRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl OpinionStore for InMemoryOpinionStore {
    async fn put(&self, record: &OpinionRecord) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::database("injected failure"));
        }
        self.records.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// In-memory SurveyStore. Clones share the same assessments.
#[derive(Debug, Clone, Default)]
pub struct InMemorySurveyStore {
    assessments: Arc<Mutex<HashMap<String, Vec<HealthAssessment>>>>,
}

impl InMemorySurveyStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an assessment without going through the port.
    pub fn seed(&self, contact: &str, health: HealthAssessment) {
        self.assessments
            .lock()
            .unwrap()
            .entry(contact.to_string())
            .or_default()
            .push(health);
    }

    /// The most recent assessment for the contact.
    pub fn latest(&self, contact: &str) -> Option<HealthAssessment> {
        self.assessments
            .lock()
            .unwrap()
            .get(contact)
            .and_then(|list| list.last().cloned())
    }
}

#[async_trait]
impl SurveyStore for InMemorySurveyStore {
    async fn latest_health(&self, contact: &str) -> Result<Option<HealthAssessment>, StoreError> {
        Ok(self.latest(contact))
    }

    async fn record_health(
        &self,
        contact: &str,
        health: &HealthAssessment,
    ) -> Result<(), StoreError> {
        self.seed(contact, health.clone());
        Ok(())
    }
}
