//! UI/backend events and error modeling for desktop GUI controller.

use client_core::DatasetFile;
use shared::domain::{ClassificationOutcome, PlanetCandidate, RequestGeneration};

use crate::backend_bridge::star_image::DecodedImage;

pub enum UiEvent {
    Info(String),
    AnalysisFinished {
        generation: RequestGeneration,
        outcome: ClassificationOutcome,
    },
    DatasetRead(DatasetFile),
    DashboardLoaded(Vec<PlanetCandidate>),
    StarImageLoaded {
        url: String,
        image: DecodedImage,
    },
    StarImageFailed {
        url: String,
        reason: String,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    DatasetRead,
    Dashboard,
}

/// Errors that never reach the acquisition controller; analysis failures
/// travel as [`ClassificationOutcome::Failure`] instead.
#[derive(Debug, Clone)]
pub struct UiError {
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: message.into(),
        }
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_text(&self) -> String {
        let prefix = match self.context {
            UiErrorContext::BackendStartup => "Backend worker startup failure",
            UiErrorContext::DatasetRead => "Could not attach dataset",
            UiErrorContext::Dashboard => "Could not load precomputed results",
        };
        format!("{prefix}: {}", self.message)
    }
}
