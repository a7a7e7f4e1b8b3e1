use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::BatchSummary;

pub const BATCH_ENDPOINT: &str = "/api/exoplanet-detection-csv";
pub const STAR_INFO_ENDPOINT: &str = "/api/star-info";
pub const PREDICT_SINGLE_ENDPOINT: &str = "/api/predict-single";

/// Multipart field name the batch endpoint reads the CSV from.
pub const BATCH_FILE_FIELD: &str = "file";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<BatchSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<RowPayload>>,
    /// Older service builds answer with a bare prediction list and no summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictions: Option<Vec<RowPayload>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RowPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_number: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_exoplanet: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proba: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StarInfoRequest {
    pub star_name: String,
}

/// Host-star metadata as returned by the catalog lookup. Fields are kept
/// exactly as received; numeric-looking values may arrive as strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StellarRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spectral_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_stars: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_planets: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constellation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub star_radius: Option<Value>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManualPredictionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proba: Option<Vec<f64>>,
}

/// Error envelope shapes the service may answer with. FastAPI-style
/// `detail` can be a string or a structured list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
}

impl ErrorBody {
    /// First non-empty message in `detail`, `error`, `message` order.
    pub fn first_message(&self) -> Option<String> {
        [&self.detail, &self.error, &self.message]
            .into_iter()
            .flatten()
            .find_map(value_message)
    }

    /// The explicit `error` field only; this one overrides a success status.
    pub fn explicit_error(&self) -> Option<String> {
        self.error.as_ref().and_then(value_message)
    }
}

fn value_message(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(false) => None,
        other => Some(other.to_string()),
    }
}
