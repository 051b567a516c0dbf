use std::borrow::Cow;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;

use crate::core::market::{PriceBar, PriceSeries};
use crate::error::{Result, VolcastError};
use crate::inference::sink::{PredictionRecord, ResultSink};
use crate::inference::{ConfidenceLevel, InferenceEngine, KeyFeatures, PredictionResult};

/// Request payload: raw daily bars in ascending or descending date order.
#[derive(Debug, Clone, Deserialize)]
pub struct PredictionRequest {
    pub data: Vec<PriceBar>,
}

/// Successful response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionBody {
    pub prediction: u8,
    pub prediction_text: String,
    pub confidence_score: f64,
    pub confidence_level: ConfidenceLevel,
    pub date: String,
    pub key_features: KeyFeatures,
}

impl From<&PredictionResult> for PredictionBody {
    fn from(result: &PredictionResult) -> Self {
        Self {
            prediction: result.prediction(),
            prediction_text: result.prediction_text().to_string(),
            confidence_score: result.confidence_score,
            confidence_level: result.confidence_level,
            date: result.date.format("%Y-%m-%d").to_string(),
            key_features: result.key_features,
        }
    }
}

/// Failure response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Undefined feature names, present only for insufficient history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nan_features: Option<Vec<String>>,
}

impl From<&VolcastError> for ErrorBody {
    fn from(err: &VolcastError) -> Self {
        Self {
            error: err.to_string(),
            kind: err.kind().to_string(),
            nan_features: err
                .nan_features()
                .map(|names| names.into_iter().map(String::from).collect()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Prediction(PredictionBody),
    Error(ErrorBody),
}

/// Status code plus body; either a complete prediction or an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

impl Response {
    pub fn ok(result: &PredictionResult) -> Self {
        Self {
            status_code: 200,
            body: ResponseBody::Prediction(result.into()),
        }
    }

    pub fn from_error(err: &VolcastError) -> Self {
        Self {
            status_code: err.status_code(),
            body: ResponseBody::Error(err.into()),
        }
    }

    fn bad_request(message: &str) -> Self {
        Self {
            status_code: 400,
            body: ResponseBody::Error(ErrorBody {
                error: message.to_string(),
                kind: "MalformedInputError".to_string(),
                nan_features: None,
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

/// Serves prediction requests with one engine, optionally recording each
/// successful prediction in a result sink.
pub struct PredictionHandler {
    engine: InferenceEngine,
    sink: Option<Box<dyn ResultSink>>,
}

impl PredictionHandler {
    pub fn new(engine: InferenceEngine) -> Self {
        Self { engine, sink: None }
    }

    pub fn with_sink(mut self, sink: Box<dyn ResultSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Handles a raw JSON event, either an object or a string holding one.
    /// Every failure becomes an error response.
    pub fn handle_event(&self, event: &Value) -> Response {
        let event = match event {
            Value::String(body) => match serde_json::from_str::<Value>(body) {
                Ok(value) => Cow::Owned(value),
                Err(e) => return self.fail(VolcastError::malformed(format!("event body: {e}"))),
            },
            other => Cow::Borrowed(other),
        };

        match event.get("data") {
            None | Some(Value::Null) => return Response::bad_request("missing data field"),
            Some(Value::Array(rows)) if rows.is_empty() => {
                return Response::bad_request("missing data field");
            }
            _ => {}
        }

        match serde_json::from_value::<PredictionRequest>(event.into_owned()) {
            Ok(request) => self.handle(request),
            Err(e) => self.fail(VolcastError::malformed(e.to_string())),
        }
    }

    /// Handles a parsed request.
    pub fn handle(&self, request: PredictionRequest) -> Response {
        match self.run(request) {
            Ok(result) => Response::ok(&result),
            Err(e) => self.fail(e),
        }
    }

    fn run(&self, request: PredictionRequest) -> Result<PredictionResult> {
        let series = PriceSeries::from_either_order(request.data)?;
        let result = self.engine.predict_series(&series)?;

        if let Some(sink) = &self.sink {
            sink.put(PredictionRecord::new(&result, Utc::now()))?;
        }
        Ok(result)
    }

    fn fail(&self, err: VolcastError) -> Response {
        error!(status = err.status_code(), kind = err.kind(), "error: {err}");
        Response::from_error(&err)
    }
}
