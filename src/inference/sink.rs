use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, VolcastError};
use crate::inference::{ConfidenceLevel, KeyFeatures, PredictionResult};

/// What a result store keeps per trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// `YYYY-MM-DD`; the store key
    pub date: String,
    pub prediction: u8,
    pub prediction_text: String,
    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,
    /// When the record was produced
    pub timestamp: DateTime<Utc>,
    pub key_features: KeyFeatures,
}

impl PredictionRecord {
    pub fn new(result: &PredictionResult, timestamp: DateTime<Utc>) -> Self {
        Self {
            date: result.date.format("%Y-%m-%d").to_string(),
            prediction: result.prediction(),
            prediction_text: result.prediction_text().to_string(),
            confidence_score: result.confidence_score,
            confidence_level: result.confidence_level,
            timestamp,
            key_features: result.key_features,
        }
    }
}

/// A key-value store of predictions keyed by date.
pub trait ResultSink: Send + Sync {
    /// Stores `record`, replacing any earlier record for the same date.
    fn put(&self, record: PredictionRecord) -> Result<()>;
}

/// Keeps records in process memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<BTreeMap<String, PredictionRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stored record for `date` (`YYYY-MM-DD`), if any.
    pub fn get(&self, date: &str) -> Result<Option<PredictionRecord>> {
        Ok(self.records(date)?.get(date).cloned())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.records("all dates")?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Fails once a writer has panicked while holding the lock.
    fn records(&self, scope: &str) -> Result<MutexGuard<'_, BTreeMap<String, PredictionRecord>>> {
        self.records
            .lock()
            .map_err(|e| VolcastError::Sink(format!("{scope}: {e}")))
    }
}

impl ResultSink for MemorySink {
    fn put(&self, record: PredictionRecord) -> Result<()> {
        let date = record.date.clone();
        self.records(&date)?.insert(date.clone(), record);
        info!(%date, "saved prediction");
        Ok(())
    }
}
