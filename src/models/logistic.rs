use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::inference::Classifier;

/// Standardized linear-logistic classifier.
///
/// `p(increase) = sigmoid(intercept + sum(beta[i] * (x[i] - xmeans[i]) / xscales[i]))`,
/// predicting class 1 when that probability is at least one half.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub beta: Vec<f64>,
    pub xmeans: Vec<f64>,
    pub xscales: Vec<f64>,
    pub intercept: f64,
}

impl LogisticModel {
    pub fn nvars(&self) -> usize {
        self.beta.len()
    }

    /// Checks that the coefficient vectors agree and every scale is usable.
    pub fn validate(&self) -> Result<(), String> {
        let n = self.beta.len();
        if self.xmeans.len() != n || self.xscales.len() != n {
            return Err(format!(
                "coefficient lengths differ: beta {}, xmeans {}, xscales {}",
                n,
                self.xmeans.len(),
                self.xscales.len()
            ));
        }
        if let Some(i) = self.xscales.iter().position(|s| !s.is_finite() || *s <= 0.0) {
            return Err(format!("xscales[{i}] must be positive"));
        }
        let all_finite = self
            .beta
            .iter()
            .chain(&self.xmeans)
            .chain(std::iter::once(&self.intercept))
            .all(|v| v.is_finite());
        if !all_finite {
            return Err("coefficients must be finite".to_string());
        }
        Ok(())
    }

    fn probability_of_increase(&self, features: &[f64]) -> Result<f64, ClassifierError> {
        if features.len() != self.nvars() {
            return Err(ClassifierError::new(format!(
                "expected {} features, got {}",
                self.nvars(),
                features.len()
            )));
        }

        let z: f64 = self.intercept
            + features
                .iter()
                .enumerate()
                .map(|(ivar, &x)| self.beta[ivar] * (x - self.xmeans[ivar]) / self.xscales[ivar])
                .sum::<f64>();

        let p = 1.0 / (1.0 + (-z).exp());
        if p.is_finite() {
            Ok(p)
        } else {
            Err(ClassifierError::new("non-finite model output"))
        }
    }
}

impl Classifier for LogisticModel {
    fn predict(&self, features: &[f64]) -> Result<u8, ClassifierError> {
        Ok(u8::from(self.probability_of_increase(features)? >= 0.5))
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ClassifierError> {
        let p = self.probability_of_increase(features)?;
        Ok(vec![1.0 - p, p])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> LogisticModel {
        LogisticModel {
            beta: vec![2.0, -1.0],
            xmeans: vec![0.0, 1.0],
            xscales: vec![1.0, 2.0],
            intercept: 0.0,
        }
    }

    #[test]
    fn test_probabilities() {
        let m = model();

        // z = 0 -> p = 0.5, predicted as increase
        let proba = m.predict_proba(&[0.0, 1.0]).unwrap();
        assert!((proba[0] - 0.5).abs() < 1e-12);
        assert_eq!(m.predict(&[0.0, 1.0]).unwrap(), 1);

        // z = 2 * -1 = -2
        let proba = m.predict_proba(&[-1.0, 1.0]).unwrap();
        assert!(proba[1] < 0.5);
        assert!((proba[0] + proba[1] - 1.0).abs() < 1e-12);
        assert_eq!(m.predict(&[-1.0, 1.0]).unwrap(), 0);
    }

    #[test]
    fn test_wrong_dimension() {
        assert!(model().predict(&[1.0]).is_err());
    }

    #[test]
    fn test_validate() {
        let mut m = model();
        assert!(m.validate().is_ok());

        m.xscales[1] = 0.0;
        assert!(m.validate().is_err());

        let mut m = model();
        m.xmeans.pop();
        assert!(m.validate().is_err());
    }
}
