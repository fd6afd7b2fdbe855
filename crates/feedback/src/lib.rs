//! Clinician feedback persistence.
//!
//! Stores per-prediction feedback and aggregate performance metrics in a
//! single SQLite database file. Feedback drives offline threshold tuning
//! and model review; nothing in the reasoning chain depends on it at
//! query time.

use chrono::{DateTime, Utc};
use clinmesh_core::error::FeedbackError;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};
use uuid::Uuid;

/// How a clinician judged a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackOutcome {
    Correct,
    Incorrect,
    Unclear,
}

impl FeedbackOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Correct => "correct",
            Self::Incorrect => "incorrect",
            Self::Unclear => "unclear",
        }
    }
}

impl FromStr for FeedbackOutcome {
    type Err = FeedbackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "correct" => Ok(Self::Correct),
            "incorrect" => Ok(Self::Incorrect),
            "unclear" => Ok(Self::Unclear),
            other => Err(FeedbackError::QueryFailed(format!(
                "Unknown outcome: {other}"
            ))),
        }
    }
}

/// One clinician's judgement of one prediction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicalFeedback {
    pub prediction_id: String,
    pub predicted_diagnosis: String,
    pub clinician_diagnosis: String,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
    pub outcome: FeedbackOutcome,
    pub reasoning: String,
    /// Anonymized patient reference for aggregation.
    pub patient_ref: String,
}

impl ClinicalFeedback {
    /// New feedback with a generated prediction id and current timestamp.
    pub fn new(
        predicted_diagnosis: impl Into<String>,
        clinician_diagnosis: impl Into<String>,
        confidence: f64,
        outcome: FeedbackOutcome,
    ) -> Self {
        Self {
            prediction_id: Uuid::new_v4().to_string(),
            predicted_diagnosis: predicted_diagnosis.into(),
            clinician_diagnosis: clinician_diagnosis.into(),
            confidence,
            timestamp: Utc::now(),
            outcome,
            reasoning: String::new(),
            patient_ref: String::new(),
        }
    }
}

/// Aggregate counts over recorded feedback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackSummary {
    pub total: usize,
    pub correct: usize,
    pub incorrect: usize,
    pub unclear: usize,
    /// Correct over resolved (correct + incorrect) outcomes; 0.0 when
    /// nothing is resolved yet.
    pub accuracy: f64,
}

/// A named performance measurement at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceMetric {
    pub metric_name: String,
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub sample_size: i64,
}

/// SQLite-backed feedback store.
pub struct FeedbackStore {
    pool: SqlitePool,
}

impl FeedbackStore {
    /// Open or create a feedback database at the given path.
    ///
    /// Pass `"sqlite::memory:"` for an ephemeral in-process database.
    pub async fn new(path: &str) -> Result<Self, FeedbackError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| FeedbackError::Storage(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| FeedbackError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("Feedback store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, FeedbackError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), FeedbackError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feedback (
                prediction_id       TEXT PRIMARY KEY,
                predicted_diagnosis TEXT NOT NULL,
                clinician_diagnosis TEXT NOT NULL,
                confidence          REAL NOT NULL,
                timestamp           TEXT NOT NULL,
                outcome             TEXT NOT NULL,
                reasoning           TEXT NOT NULL DEFAULT '',
                patient_ref         TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| FeedbackError::MigrationFailed(format!("feedback table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS performance_metrics (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                metric_name TEXT NOT NULL,
                value       REAL NOT NULL,
                timestamp   TEXT NOT NULL,
                sample_size INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| FeedbackError::MigrationFailed(format!("metrics table: {e}")))?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_feedback_timestamp ON feedback(timestamp DESC)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| FeedbackError::MigrationFailed(format!("timestamp index: {e}")))?;

        debug!("Feedback store migrations complete");
        Ok(())
    }

    /// Record feedback; a second record for the same prediction id
    /// replaces the first.
    pub async fn record(&self, feedback: &ClinicalFeedback) -> Result<(), FeedbackError> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO feedback
                (prediction_id, predicted_diagnosis, clinician_diagnosis,
                 confidence, timestamp, outcome, reasoning, patient_ref)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&feedback.prediction_id)
        .bind(&feedback.predicted_diagnosis)
        .bind(&feedback.clinician_diagnosis)
        .bind(feedback.confidence)
        .bind(feedback.timestamp.to_rfc3339())
        .bind(feedback.outcome.as_str())
        .bind(&feedback.reasoning)
        .bind(&feedback.patient_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| FeedbackError::Storage(format!("INSERT failed: {e}")))?;

        info!(
            prediction_id = %feedback.prediction_id,
            outcome = feedback.outcome.as_str(),
            "Recorded clinician feedback"
        );
        Ok(())
    }

    /// Fetch feedback by prediction id.
    pub async fn get(&self, prediction_id: &str) -> Result<Option<ClinicalFeedback>, FeedbackError> {
        let row = sqlx::query("SELECT * FROM feedback WHERE prediction_id = ?1")
            .bind(prediction_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| FeedbackError::QueryFailed(format!("GET by id: {e}")))?;

        match row {
            Some(ref r) => Ok(Some(Self::row_to_feedback(r)?)),
            None => Ok(None),
        }
    }

    /// Most recent feedback entries, newest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<ClinicalFeedback>, FeedbackError> {
        let rows = sqlx::query("SELECT * FROM feedback ORDER BY timestamp DESC LIMIT ?1")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FeedbackError::QueryFailed(format!("recent: {e}")))?;

        rows.iter().map(Self::row_to_feedback).collect()
    }

    /// Aggregate outcome counts and accuracy over resolved outcomes.
    pub async fn accuracy(&self) -> Result<FeedbackSummary, FeedbackError> {
        let rows = sqlx::query("SELECT outcome, COUNT(*) as cnt FROM feedback GROUP BY outcome")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| FeedbackError::QueryFailed(format!("accuracy: {e}")))?;

        let mut summary = FeedbackSummary::default();
        for row in &rows {
            let outcome: String = row
                .try_get("outcome")
                .map_err(|e| FeedbackError::QueryFailed(format!("outcome column: {e}")))?;
            let count: i64 = row
                .try_get("cnt")
                .map_err(|e| FeedbackError::QueryFailed(format!("cnt column: {e}")))?;
            let count = count as usize;
            summary.total += count;
            match outcome.as_str() {
                "correct" => summary.correct = count,
                "incorrect" => summary.incorrect = count,
                _ => summary.unclear = count,
            }
        }

        let resolved = summary.correct + summary.incorrect;
        if resolved > 0 {
            summary.accuracy = summary.correct as f64 / resolved as f64;
        }
        Ok(summary)
    }

    /// Record one performance measurement.
    pub async fn record_metric(
        &self,
        metric_name: &str,
        value: f64,
        sample_size: i64,
    ) -> Result<(), FeedbackError> {
        sqlx::query(
            r#"
            INSERT INTO performance_metrics (metric_name, value, timestamp, sample_size)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(metric_name)
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .bind(sample_size)
        .execute(&self.pool)
        .await
        .map_err(|e| FeedbackError::Storage(format!("metric INSERT failed: {e}")))?;

        debug!(metric_name, value, "Recorded performance metric");
        Ok(())
    }

    /// All measurements for one metric, newest first.
    pub async fn metrics(&self, metric_name: &str) -> Result<Vec<PerformanceMetric>, FeedbackError> {
        let rows = sqlx::query(
            "SELECT * FROM performance_metrics WHERE metric_name = ?1 ORDER BY timestamp DESC",
        )
        .bind(metric_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| FeedbackError::QueryFailed(format!("metrics: {e}")))?;

        rows.iter()
            .map(|row| {
                let timestamp_str: String = row
                    .try_get("timestamp")
                    .map_err(|e| FeedbackError::QueryFailed(format!("timestamp column: {e}")))?;
                let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                    .map(|dt| dt.with_timezone(&Utc))
                    .unwrap_or_else(|_| Utc::now());
                Ok(PerformanceMetric {
                    metric_name: row
                        .try_get("metric_name")
                        .map_err(|e| FeedbackError::QueryFailed(format!("name column: {e}")))?,
                    value: row
                        .try_get("value")
                        .map_err(|e| FeedbackError::QueryFailed(format!("value column: {e}")))?,
                    timestamp,
                    sample_size: row
                        .try_get("sample_size")
                        .map_err(|e| FeedbackError::QueryFailed(format!("size column: {e}")))?,
                })
            })
            .collect()
    }

    fn row_to_feedback(row: &sqlx::sqlite::SqliteRow) -> Result<ClinicalFeedback, FeedbackError> {
        let timestamp_str: String = row
            .try_get("timestamp")
            .map_err(|e| FeedbackError::QueryFailed(format!("timestamp column: {e}")))?;
        let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let outcome_str: String = row
            .try_get("outcome")
            .map_err(|e| FeedbackError::QueryFailed(format!("outcome column: {e}")))?;

        Ok(ClinicalFeedback {
            prediction_id: row
                .try_get("prediction_id")
                .map_err(|e| FeedbackError::QueryFailed(format!("id column: {e}")))?,
            predicted_diagnosis: row
                .try_get("predicted_diagnosis")
                .map_err(|e| FeedbackError::QueryFailed(format!("predicted column: {e}")))?,
            clinician_diagnosis: row
                .try_get("clinician_diagnosis")
                .map_err(|e| FeedbackError::QueryFailed(format!("clinician column: {e}")))?,
            confidence: row
                .try_get("confidence")
                .map_err(|e| FeedbackError::QueryFailed(format!("confidence column: {e}")))?,
            timestamp,
            outcome: outcome_str.parse()?,
            reasoning: row
                .try_get("reasoning")
                .map_err(|e| FeedbackError::QueryFailed(format!("reasoning column: {e}")))?,
            patient_ref: row
                .try_get("patient_ref")
                .map_err(|e| FeedbackError::QueryFailed(format!("patient column: {e}")))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> FeedbackStore {
        FeedbackStore::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn record_and_get() {
        let store = test_store().await;
        let mut feedback =
            ClinicalFeedback::new("Pneumonia", "Pneumonia", 0.85, FeedbackOutcome::Correct);
        feedback.reasoning = "Chest x-ray confirmed infiltrate".into();
        feedback.patient_ref = "anon-001".into();

        store.record(&feedback).await.unwrap();

        let fetched = store.get(&feedback.prediction_id).await.unwrap().unwrap();
        assert_eq!(fetched.predicted_diagnosis, "Pneumonia");
        assert_eq!(fetched.outcome, FeedbackOutcome::Correct);
        assert_eq!(fetched.patient_ref, "anon-001");
        assert!((fetched.confidence - 0.85).abs() < 1e-9);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = test_store().await;
        assert!(store.get("no-such-id").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rerecording_replaces_earlier_judgement() {
        let store = test_store().await;
        let mut feedback =
            ClinicalFeedback::new("Malaria", "Unclear", 0.6, FeedbackOutcome::Unclear);
        store.record(&feedback).await.unwrap();

        feedback.clinician_diagnosis = "Malaria".into();
        feedback.outcome = FeedbackOutcome::Correct;
        store.record(&feedback).await.unwrap();

        let summary = store.accuracy().await.unwrap();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.correct, 1);
    }

    #[tokio::test]
    async fn accuracy_ignores_unclear_outcomes() {
        let store = test_store().await;
        for outcome in [
            FeedbackOutcome::Correct,
            FeedbackOutcome::Correct,
            FeedbackOutcome::Correct,
            FeedbackOutcome::Incorrect,
            FeedbackOutcome::Unclear,
        ] {
            store
                .record(&ClinicalFeedback::new("Dx", "Dx2", 0.7, outcome))
                .await
                .unwrap();
        }

        let summary = store.accuracy().await.unwrap();
        assert_eq!(summary.total, 5);
        assert_eq!(summary.unclear, 1);
        assert!((summary.accuracy - 0.75).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_store_has_zero_accuracy() {
        let store = test_store().await;
        let summary = store.accuracy().await.unwrap();
        assert_eq!(summary.total, 0);
        assert_eq!(summary.accuracy, 0.0);
    }

    #[tokio::test]
    async fn recent_returns_newest_first() {
        let store = test_store().await;
        for i in 0..5 {
            let mut feedback =
                ClinicalFeedback::new(format!("Dx{i}"), "Other", 0.5, FeedbackOutcome::Unclear);
            feedback.timestamp = Utc::now() + chrono::Duration::seconds(i);
            store.record(&feedback).await.unwrap();
        }

        let recent = store.recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].predicted_diagnosis, "Dx4");
    }

    #[tokio::test]
    async fn metrics_round_trip() {
        let store = test_store().await;
        store.record_metric("diagnostic_accuracy", 0.82, 40).await.unwrap();
        store.record_metric("diagnostic_accuracy", 0.85, 60).await.unwrap();
        store.record_metric("latency_ms", 120.0, 60).await.unwrap();

        let metrics = store.metrics("diagnostic_accuracy").await.unwrap();
        assert_eq!(metrics.len(), 2);
        assert!(metrics.iter().all(|m| m.metric_name == "diagnostic_accuracy"));
    }

    #[tokio::test]
    async fn outcome_parse_round_trip() {
        for outcome in [
            FeedbackOutcome::Correct,
            FeedbackOutcome::Incorrect,
            FeedbackOutcome::Unclear,
        ] {
            assert_eq!(outcome.as_str().parse::<FeedbackOutcome>().unwrap(), outcome);
        }
        assert!("wrong".parse::<FeedbackOutcome>().is_err());
    }
}
