use std::sync::{Arc, OnceLock};

use tracing::info;

use crate::error::Result;
use crate::inference::classifier::Classifier;

/// Where a trained classifier comes from: a local artifact, a blob store, or
/// anything else able to produce one.
pub trait ModelSource: Send + Sync {
    /// Human-readable location, used in logs and load errors.
    fn describe(&self) -> String;

    /// Fetches and decodes the classifier.
    fn load(&self) -> Result<Arc<dyn Classifier>>;
}

/// Holds at most one loaded classifier for the lifetime of its owner.
///
/// The first successful load populates the cache; later lookups reuse it
/// without touching the source. A failed load leaves the cache empty.
#[derive(Default)]
pub struct ModelCache {
    slot: OnceLock<Arc<dyn Classifier>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache pre-populated with an already loaded classifier.
    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            slot: OnceLock::from(classifier),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Returns the cached classifier, loading it from `source` on first use.
    pub fn get_or_load(&self, source: &dyn ModelSource) -> Result<Arc<dyn Classifier>> {
        if let Some(classifier) = self.slot.get() {
            return Ok(Arc::clone(classifier));
        }

        info!(source = %source.describe(), "loading model");
        let loaded = source.load()?;
        // If another caller won the race, keep theirs.
        let classifier = self.slot.get_or_init(|| loaded);
        info!("model loaded");
        Ok(Arc::clone(classifier))
    }
}
