use crate::error::ClassifierError;

/// A trained binary classifier over the canonical feature vector.
///
/// Class 1 means "volatility will increase". Implementations receive the
/// features in canonical order and must not reorder them.
pub trait Classifier: Send + Sync {
    /// Predicted class label, 0 or 1.
    fn predict(&self, features: &[f64]) -> Result<u8, ClassifierError>;

    /// Per-class probabilities, indexed by class label.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError>;
}
