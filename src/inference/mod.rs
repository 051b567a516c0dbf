//! Turns the latest feature row and a trained classifier into a prediction.

pub mod cache;
pub mod classifier;
pub mod handler;
pub mod sink;

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::market::PriceSeries;
use crate::error::{ClassifierError, Result, VolcastError};
use crate::features::{Feature, FeatureRow, FeatureTable, assemble};

pub use cache::{ModelCache, ModelSource};
pub use classifier::Classifier;

/// Scores at or above this are "high" confidence.
pub const HIGH_CONFIDENCE: f64 = 0.70;
/// Scores at or above this (and below `HIGH_CONFIDENCE`) are "medium".
pub const MEDIUM_CONFIDENCE: f64 = 0.55;

/// Bucketed classifier confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Fixed policy: `>= 0.70` high, `>= 0.55` medium, otherwise low.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_CONFIDENCE {
            Self::High
        } else if score >= MEDIUM_CONFIDENCE {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Forecast direction of 20-day realized volatility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Decrease = 0,
    Increase = 1,
}

impl Direction {
    pub fn from_label(label: u8) -> Option<Self> {
        match label {
            0 => Some(Self::Decrease),
            1 => Some(Self::Increase),
            _ => None,
        }
    }

    pub fn label(self) -> u8 {
        self as u8
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Increase => "volatility will increase",
            Self::Decrease => "volatility will decrease",
        }
    }
}

/// The curated features reported next to a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyFeatures {
    pub volatility_20d: f64,
    pub rsi: f64,
    pub bb_width: f64,
    pub macd: f64,
    pub volume_ratio: f64,
}

impl KeyFeatures {
    pub const FEATURES: [Feature; 5] = [
        Feature::Volatility20d,
        Feature::Rsi,
        Feature::BbWidth,
        Feature::Macd,
        Feature::VolumeRatio,
    ];

    /// Extracts the key features from a row; `None` if any is undefined.
    pub fn from_row(row: &FeatureRow) -> Option<Self> {
        Some(Self {
            volatility_20d: row.get(Feature::Volatility20d)?,
            rsi: row.get(Feature::Rsi)?,
            bb_width: row.get(Feature::BbWidth)?,
            macd: row.get(Feature::Macd)?,
            volume_ratio: row.get(Feature::VolumeRatio)?,
        })
    }
}

/// A complete prediction for the most recent bar.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub date: NaiveDate,
    pub direction: Direction,
    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub key_features: KeyFeatures,
}

impl PredictionResult {
    /// 1 = volatility will increase, 0 = decrease.
    pub fn prediction(&self) -> u8 {
        self.direction.label()
    }

    pub fn prediction_text(&self) -> &'static str {
        self.direction.text()
    }
}

/// Predicts from the latest row of `table`.
///
/// Fails with `InsufficientHistory`, listing every undefined feature, when
/// the latest row is incomplete. Nothing is imputed.
pub fn predict(table: &FeatureTable, classifier: &dyn Classifier) -> Result<PredictionResult> {
    let (date, row) = table
        .latest()
        .ok_or_else(|| VolcastError::malformed("empty feature table"))?;

    let missing = row.missing();
    if !missing.is_empty() {
        warn!(%date, missing = missing.len(), "latest feature row is incomplete");
        return Err(VolcastError::InsufficientHistory { missing });
    }
    let (Some(x), Some(key_features)) = (row.to_vector(), KeyFeatures::from_row(row)) else {
        return Err(VolcastError::InsufficientHistory { missing: row.missing() });
    };

    debug!(%date, "making prediction");
    let label = classifier.predict(&x)?;
    let direction = Direction::from_label(label).ok_or_else(|| {
        ClassifierError::new(format!("classifier returned label {label}, expected 0 or 1"))
    })?;

    let probabilities = classifier.predict_proba(&x)?;
    let confidence_score = confidence_score(&probabilities)?;
    let confidence_level = ConfidenceLevel::from_score(confidence_score);

    let result = PredictionResult {
        date,
        direction,
        confidence_score,
        confidence_level,
        key_features,
    };
    info!(
        %date,
        prediction = result.prediction_text(),
        confidence = %confidence_level,
        score = confidence_score,
        "prediction successful"
    );
    Ok(result)
}

/// Probability mass on the predicted class: the larger of the two class
/// probabilities.
fn confidence_score(probabilities: &[f64]) -> std::result::Result<f64, ClassifierError> {
    if probabilities.len() != 2 {
        return Err(ClassifierError::new(format!(
            "expected 2 class probabilities, got {}",
            probabilities.len()
        )));
    }
    if probabilities
        .iter()
        .any(|p| !p.is_finite() || !(0.0..=1.0).contains(p))
    {
        return Err(ClassifierError::new(format!(
            "class probabilities out of range: {probabilities:?}"
        )));
    }
    Ok(probabilities[0].max(probabilities[1]))
}

/// Feature assembly plus prediction, with the classifier loaded lazily from
/// `source` into the injected cache.
pub struct InferenceEngine {
    source: Box<dyn ModelSource>,
    cache: ModelCache,
}

impl InferenceEngine {
    pub fn new(source: Box<dyn ModelSource>, cache: ModelCache) -> Self {
        Self { source, cache }
    }

    /// The cached classifier, loading it on first use.
    pub fn classifier(&self) -> Result<Arc<dyn Classifier>> {
        self.cache.get_or_load(self.source.as_ref())
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.is_loaded()
    }

    /// Engineers features for `series` and predicts from its latest bar.
    pub fn predict_series(&self, series: &PriceSeries) -> Result<PredictionResult> {
        let classifier = self.classifier()?;
        debug!(bars = series.len(), "engineering features");
        let table = assemble(series);
        predict(&table, classifier.as_ref())
    }
}
