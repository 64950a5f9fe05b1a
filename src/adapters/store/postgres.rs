//! PostgreSQL implementations of the opinion and survey stores.

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::opinion::OpinionRecord;
use crate::domain::survey::HealthAssessment;
use crate::ports::{OpinionStore, StoreError, SurveyStore};

/// PostgreSQL implementation of OpinionStore.
#[derive(Clone)]
pub struct PostgresOpinionStore {
    pool: PgPool,
}

impl PostgresOpinionStore {
    /// Creates a new PostgresOpinionStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OpinionStore for PostgresOpinionStore {
    async fn put(&self, record: &OpinionRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO opinions (id, contact, description, latitude, longitude, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(&record.contact)
        .bind(&record.description)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to insert opinion: {}", e)))?;

        Ok(())
    }
}

/// PostgreSQL implementation of SurveyStore.
#[derive(Clone)]
pub struct PostgresSurveyStore {
    pool: PgPool,
}

impl PostgresSurveyStore {
    /// Creates a new PostgresSurveyStore.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SurveyStore for PostgresSurveyStore {
    async fn latest_health(&self, contact: &str) -> Result<Option<HealthAssessment>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT score, note
            FROM health_surveys
            WHERE contact = $1
            ORDER BY recorded_at DESC
            LIMIT 1
            "#,
        )
        .bind(contact)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to query health surveys: {}", e)))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let score: i32 = row
            .try_get("score")
            .map_err(|e| StoreError::database(format!("Failed to read score: {}", e)))?;
        let note: String = row
            .try_get("note")
            .map_err(|e| StoreError::database(format!("Failed to read note: {}", e)))?;

        Ok(Some(HealthAssessment { score, note }))
    }

    async fn record_health(
        &self,
        contact: &str,
        health: &HealthAssessment,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO health_surveys (id, contact, score, note, recorded_at)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(contact)
        .bind(health.score)
        .bind(&health.note)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::database(format!("Failed to insert health survey: {}", e)))?;

        Ok(())
    }
}
