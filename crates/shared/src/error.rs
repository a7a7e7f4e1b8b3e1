use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Network,
    Backend,
    Decode,
    Dataset,
}

/// Rejections raised before any network call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a Star ID.")]
    EmptyIdentifier,
    #[error("Attach a CSV file or select the default sample data.")]
    NoDataset,
    #[error("An analysis is already in progress.")]
    Busy,
}

/// A terminal, user-visible analysis error. `message` is shown verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct AnalysisError {
    pub kind: ErrorKind,
    pub message: String,
}

impl AnalysisError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ValidationError> for AnalysisError {
    fn from(value: ValidationError) -> Self {
        Self::new(ErrorKind::Validation, value.to_string())
    }
}
