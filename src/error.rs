use thiserror::Error;

use crate::features::Feature;

/// Result type for this library
pub type Result<T> = std::result::Result<T, VolcastError>;

/// Failure raised by a classifier implementation.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ClassifierError(pub String);

impl ClassifierError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Library error type
#[derive(Debug, Error)]
pub enum VolcastError {
    /// The latest feature row has undefined features; more history is needed.
    #[error("nan values in features - need more historical data ({} undefined: {})", .missing.len(), feature_list(.missing))]
    InsufficientHistory { missing: Vec<Feature> },

    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("classifier invocation failed: {0}")]
    ClassifierInvocation(#[from] ClassifierError),

    #[error("failed to load model from {source_name}: {reason}")]
    ModelLoad { source_name: String, reason: String },

    #[error("result sink error: {0}")]
    Sink(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl VolcastError {
    /// HTTP-style status reported at the request boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InsufficientHistory { .. }
            | Self::MalformedInput(_)
            | Self::InvalidParameter(_) => 400,
            _ => 500,
        }
    }

    /// Stable name of the error kind, reported alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InsufficientHistory { .. } => "InsufficientHistoryError",
            Self::MalformedInput(_) => "MalformedInputError",
            Self::InvalidParameter(_) => "InvalidParameterError",
            Self::ClassifierInvocation(_) => "ClassifierInvocationError",
            Self::ModelLoad { .. } => "ModelLoadError",
            Self::Sink(_) => "SinkError",
            Self::Io(_) => "IoError",
            Self::Json(_) => "JsonError",
            Self::Csv(_) => "CsvError",
        }
    }

    /// Names of the undefined features, for the insufficient-history case.
    pub fn nan_features(&self) -> Option<Vec<&'static str>> {
        match self {
            Self::InsufficientHistory { missing } => {
                Some(missing.iter().map(|f| f.name()).collect())
            }
            _ => None,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }
}

fn feature_list(features: &[Feature]) -> String {
    features
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}
