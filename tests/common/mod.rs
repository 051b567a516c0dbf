#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use volcast::{Classifier, ClassifierError, ModelSource, PriceBar, Result};

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 1, 2).unwrap()
}

/// Smooth oscillating uptrend with a weekly volume pattern.
pub fn synthetic_bars(n: usize) -> Vec<PriceBar> {
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.1;
            PriceBar {
                date: start_date() + Duration::days(i as i64),
                open: close - 0.2,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000_000.0 + (i % 7) as f64 * 10_000.0,
            }
        })
        .collect()
}

/// Seeded geometric random walk.
pub fn random_walk_bars(n: usize, seed: u64) -> Vec<PriceBar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut close = 50.0;
    (0..n)
        .map(|i| {
            close *= 1.0 + rng.gen_range(-0.02..0.02);
            let spread = close * rng.gen_range(0.001..0.02);
            PriceBar {
                date: start_date() + Duration::days(i as i64),
                open: close * (1.0 + rng.gen_range(-0.005..0.005)),
                high: close + spread,
                low: close - spread,
                close,
                volume: rng.gen_range(500_000.0..2_000_000.0),
            }
        })
        .collect()
}

/// Returns a fixed label and class probabilities.
pub struct FixedClassifier {
    pub label: u8,
    pub proba: Vec<f64>,
}

impl Classifier for FixedClassifier {
    fn predict(&self, _features: &[f64]) -> std::result::Result<u8, ClassifierError> {
        Ok(self.label)
    }

    fn predict_proba(&self, _features: &[f64]) -> std::result::Result<Vec<f64>, ClassifierError> {
        Ok(self.proba.clone())
    }
}

/// Always fails.
pub struct BrokenClassifier;

impl Classifier for BrokenClassifier {
    fn predict(&self, _features: &[f64]) -> std::result::Result<u8, ClassifierError> {
        Err(ClassifierError::new("model exploded"))
    }

    fn predict_proba(&self, _features: &[f64]) -> std::result::Result<Vec<f64>, ClassifierError> {
        Err(ClassifierError::new("model exploded"))
    }
}

/// Hands out the same classifier and counts how often it was asked to.
pub struct CountingSource {
    pub classifier: Arc<dyn Classifier>,
    pub loads: Arc<AtomicUsize>,
}

impl CountingSource {
    pub fn new(classifier: impl Classifier + 'static) -> (Self, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let source = Self {
            classifier: Arc::new(classifier),
            loads: Arc::clone(&loads),
        };
        (source, loads)
    }
}

impl ModelSource for CountingSource {
    fn describe(&self) -> String {
        "counting source".to_string()
    }

    fn load(&self) -> Result<Arc<dyn Classifier>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::clone(&self.classifier))
    }
}

pub fn increase_82() -> FixedClassifier {
    FixedClassifier {
        label: 1,
        proba: vec![0.18, 0.82],
    }
}
