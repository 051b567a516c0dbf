//! Daily volatility-direction forecasting.
//!
//! Raw OHLCV bars go through a fixed technical-indicator pipeline
//! ([`features::assemble`]) and the latest complete row is scored by a
//! trained classifier ([`inference::predict`]). [`labeler`] builds the
//! matching training targets offline.

pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod inference;
pub mod labeler;
pub mod models;

pub use config::{Args, Command, Config};
pub use crate::core::io::{load_price_series, read_bars_csv, write_file};
pub use crate::core::market::{PriceBar, PriceSeries};
pub use error::{ClassifierError, Result, VolcastError};
pub use features::{Feature, FeatureRow, FeatureTable, assemble};
pub use inference::handler::{PredictionHandler, PredictionRequest, Response};
pub use inference::{
    Classifier, ConfidenceLevel, Direction, InferenceEngine, KeyFeatures, ModelCache,
    ModelSource, PredictionResult, predict,
};
pub use labeler::{TrainingSet, label_targets};
pub use models::{LocalModelSource, LogisticModel, SavedModel};
