use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::io::create_parent_dirs;
use crate::error::{Result, VolcastError};
use crate::features::Feature;
use crate::inference::{Classifier, ModelSource};
use crate::labeler::DEFAULT_HORIZON;
use crate::models::logistic::LogisticModel;

/// Container for a saved model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedModel {
    /// Feature names in the order the model expects them
    pub feature_names: Vec<String>,
    /// Label horizon the model was trained for, in bars
    #[serde(default = "default_horizon")]
    pub horizon: usize,
    /// Trained coefficients, stored alongside the feature names
    #[serde(flatten)]
    pub model: LogisticModel,
}

fn default_horizon() -> usize {
    DEFAULT_HORIZON
}

impl SavedModel {
    /// Create a new SavedModel container over the canonical features
    pub fn new(model: LogisticModel, horizon: usize) -> Self {
        Self {
            feature_names: Feature::names().into_iter().map(String::from).collect(),
            horizon,
            model,
        }
    }

    /// Checks the model against the canonical feature list.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let canonical = Feature::names();
        if self.feature_names.len() != canonical.len() {
            return Err(format!(
                "model expects {} features, pipeline produces {}",
                self.feature_names.len(),
                canonical.len()
            ));
        }
        if let Some((i, (got, want))) = self
            .feature_names
            .iter()
            .zip(&canonical)
            .enumerate()
            .find(|(_, (got, want))| got.as_str() != **want)
        {
            return Err(format!("feature {i} is '{got}', expected '{want}'"));
        }
        if self.model.nvars() != canonical.len() {
            return Err(format!(
                "model has {} coefficients for {} features",
                self.model.nvars(),
                canonical.len()
            ));
        }
        self.model.validate()
    }

    /// Save model to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        create_parent_dirs(path)?;
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!(path = %path.display(), "model saved");
        Ok(())
    }

    /// Load and validate a model from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let load_error = |reason: String| VolcastError::ModelLoad {
            source_name: path.display().to_string(),
            reason,
        };

        let file = File::open(path).map_err(|e| load_error(e.to_string()))?;
        let saved: SavedModel = serde_json::from_reader(BufReader::new(file))
            .map_err(|e| load_error(format!("failed to deserialize model: {e}")))?;
        saved.validate().map_err(load_error)?;
        Ok(saved)
    }
}

/// Loads a `SavedModel` artifact from the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalModelSource {
    path: PathBuf,
    horizon: Option<usize>,
}

impl LocalModelSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            horizon: None,
        }
    }

    /// Only accept artifacts trained for this label horizon.
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = Some(horizon);
        self
    }
}

impl ModelSource for LocalModelSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Arc<dyn Classifier>> {
        let saved = SavedModel::load(&self.path)?;
        if let Some(expected) = self.horizon.filter(|h| *h != saved.horizon) {
            return Err(VolcastError::ModelLoad {
                source_name: self.describe(),
                reason: format!(
                    "model was trained for horizon {}, configured horizon is {}",
                    saved.horizon, expected
                ),
            });
        }
        Ok(Arc::new(saved.model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::N_FEATURES;
    use tempfile::tempdir;

    fn saved() -> SavedModel {
        SavedModel::new(
            LogisticModel {
                beta: vec![0.1; N_FEATURES],
                xmeans: vec![0.0; N_FEATURES],
                xscales: vec![1.0; N_FEATURES],
                intercept: -0.2,
            },
            DEFAULT_HORIZON,
        )
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("models/volatility.json");

        saved().save(&path).unwrap();
        let loaded = SavedModel::load(&path).unwrap();
        assert_eq!(loaded.feature_names[7], "volatility_60d");
        assert_eq!(loaded.model.intercept, -0.2);

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["xscales"].as_array().unwrap().len(), N_FEATURES);
        assert_eq!(json["horizon"], 20);

        let classifier = LocalModelSource::new(&path).load().unwrap();
        let proba = classifier.predict_proba(&[0.0; N_FEATURES]).unwrap();
        assert_eq!(proba.len(), 2);
    }

    #[test]
    fn test_reordered_features_rejected() {
        let mut model = saved();
        model.feature_names.swap(0, 1);
        let err = model.validate().unwrap_err();
        assert!(err.contains("returns_5d"));
    }

    #[test]
    fn test_horizon_must_match() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("model.json");
        saved().save(&path).unwrap();

        let source = LocalModelSource::new(&path).with_horizon(DEFAULT_HORIZON);
        assert!(source.load().is_ok());

        let err = LocalModelSource::new(&path).with_horizon(10).load().err().unwrap();
        assert_eq!(err.kind(), "ModelLoadError");
        assert!(err.to_string().contains("horizon 20"));
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = LocalModelSource::new(dir.path().join("none.json"));
        assert!(matches!(missing.load(), Err(VolcastError::ModelLoad { .. })));

        let path = dir.path().join("short.json");
        let mut model = saved();
        model.model.beta.pop();
        model.save(&path).unwrap();
        let err = SavedModel::load(&path).unwrap_err();
        assert_eq!(err.status_code(), 500);
        assert!(err.to_string().contains("coefficients"));
    }
}
