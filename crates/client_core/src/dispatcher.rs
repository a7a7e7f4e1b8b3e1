//! HTTP dispatch to the remote classification service, one call per
//! acquisition mode. Single attempt, no retries.

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use shared::{
    domain::{ClassificationOutcome, ManualParameters},
    error::{AnalysisError, ErrorKind},
    protocol::{
        BatchResponse, ErrorBody, ManualPredictionResponse, StarInfoRequest, StellarRecord,
        BATCH_ENDPOINT, BATCH_FILE_FIELD, PREDICT_SINGLE_ENDPOINT, STAR_INFO_ENDPOINT,
    },
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::{ConfigError, Settings},
    controller::{AnalysisRequest, UploadSource},
    dataset::{DatasetError, DatasetFile, CSV_MIME},
    normalizer,
};

const BATCH_FAILED: &str = "File analysis failed.";
const STAR_LOOKUP_FAILED: &str = "Failed to fetch star data.";
const PREDICTION_FAILED: &str = "Prediction failed.";

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Backend { status: u16, message: String },
    #[error("unexpected response from classification service: {0}")]
    Decode(String),
    #[error("Failed to load default dataset: {0}")]
    DefaultDataset(#[from] DatasetError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Transport(_) => ErrorKind::Network,
            DispatchError::Backend { .. } => ErrorKind::Backend,
            DispatchError::Decode(_) => ErrorKind::Decode,
            DispatchError::DefaultDataset(_) => ErrorKind::Dataset,
            DispatchError::Config(_) => ErrorKind::Validation,
        }
    }
}

impl From<DispatchError> for AnalysisError {
    fn from(value: DispatchError) -> Self {
        AnalysisError::new(value.kind(), value.to_string())
    }
}

#[async_trait]
pub trait ClassificationBackend: Send + Sync {
    /// Resolves a request to exactly one outcome; failures come back as
    /// [`ClassificationOutcome::Failure`].
    async fn dispatch(&self, request: AnalysisRequest) -> ClassificationOutcome;
}

pub struct HttpDispatcher {
    http: Client,
    base_url: String,
    default_dataset_path: PathBuf,
}

impl HttpDispatcher {
    pub fn new(base_url: impl Into<String>, default_dataset_path: impl Into<PathBuf>) -> Self {
        Self::with_client(Client::new(), base_url, default_dataset_path)
    }

    pub fn with_client(
        http: Client,
        base_url: impl Into<String>,
        default_dataset_path: impl Into<PathBuf>,
    ) -> Self {
        let base_url: String = base_url.into();
        Self {
            http,
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            default_dataset_path: default_dataset_path.into(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, DispatchError> {
        let base_url = settings.backend_base_url()?;
        let http = Client::builder()
            .timeout(settings.request_timeout())
            .build()?;
        Ok(Self::with_client(
            http,
            base_url.as_str(),
            settings.default_dataset_path.clone(),
        ))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn classify_batch(&self, file: DatasetFile) -> Result<BatchResponse, DispatchError> {
        info!(file = %file.file_name, bytes = file.size_bytes(), "dispatch: batch upload");
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(CSV_MIME)?;
        let form = Form::new().part(BATCH_FILE_FIELD, part);
        let response = self
            .http
            .post(self.endpoint(BATCH_ENDPOINT))
            .multipart(form)
            .send()
            .await?;
        read_response(response, BATCH_FAILED).await
    }

    pub async fn lookup_star(&self, identifier: &str) -> Result<StellarRecord, DispatchError> {
        info!(identifier, "dispatch: star lookup");
        let response = self
            .http
            .post(self.endpoint(STAR_INFO_ENDPOINT))
            .json(&StarInfoRequest {
                star_name: identifier.to_string(),
            })
            .send()
            .await?;
        read_response(response, STAR_LOOKUP_FAILED).await
    }

    pub async fn predict_single(
        &self,
        parameters: &ManualParameters,
    ) -> Result<ManualPredictionResponse, DispatchError> {
        info!(
            koi_period = parameters.koi_period,
            koi_depth = parameters.koi_depth,
            "dispatch: single prediction"
        );
        let response = self
            .http
            .post(self.endpoint(PREDICT_SINGLE_ENDPOINT))
            .json(parameters)
            .send()
            .await?;
        read_response(response, PREDICTION_FAILED).await
    }

    async fn resolve_upload(&self, source: UploadSource) -> Result<DatasetFile, DispatchError> {
        match source {
            UploadSource::File(file) => Ok(file),
            UploadSource::BundledDefault => {
                Ok(DatasetFile::read(&self.default_dataset_path).await?)
            }
        }
    }

    async fn try_dispatch(
        &self,
        request: AnalysisRequest,
    ) -> Result<ClassificationOutcome, DispatchError> {
        match request {
            AnalysisRequest::Upload(source) => {
                let file = self.resolve_upload(source).await?;
                let payload = self.classify_batch(file).await?;
                Ok(normalizer::normalize_batch(payload))
            }
            AnalysisRequest::CatalogLookup { identifier } => {
                let record = self.lookup_star(&identifier).await?;
                Ok(normalizer::normalize_stellar(record))
            }
            AnalysisRequest::ManualEntry(parameters) => {
                let payload = self.predict_single(&parameters).await?;
                Ok(normalizer::normalize_manual(payload))
            }
        }
    }
}

#[async_trait]
impl ClassificationBackend for HttpDispatcher {
    async fn dispatch(&self, request: AnalysisRequest) -> ClassificationOutcome {
        let mode = request.mode();
        match self.try_dispatch(request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(mode = %mode, kind = ?err.kind(), "dispatch: request failed: {err}");
                ClassificationOutcome::Failure(err.into())
            }
        }
    }
}

/// Status and body classification shared by every endpoint. A non-success
/// status fails with the backend message or `generic`; an explicit `error`
/// field fails even under a success status.
async fn read_response<T: DeserializeOwned>(
    response: Response,
    generic: &str,
) -> Result<T, DispatchError> {
    let status = response.status();
    let body = response.bytes().await?;
    let value: Option<Value> = serde_json::from_slice(&body).ok();
    let envelope = value
        .as_ref()
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value::<ErrorBody>(v.clone()).ok())
        .unwrap_or_default();

    if !status.is_success() {
        return Err(DispatchError::Backend {
            status: status.as_u16(),
            message: envelope
                .first_message()
                .unwrap_or_else(|| generic.to_string()),
        });
    }

    if let Some(message) = envelope.explicit_error() {
        return Err(DispatchError::Backend {
            status: status.as_u16(),
            message,
        });
    }

    let value = value.ok_or_else(|| DispatchError::Decode("body is not JSON".to_string()))?;
    serde_json::from_value(value).map_err(|e| DispatchError::Decode(e.to_string()))
}

#[cfg(test)]
#[path = "tests/dispatcher_tests.rs"]
mod tests;
