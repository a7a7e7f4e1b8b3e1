//! Acquisition mode state machine: active mode, per-mode inputs, and the
//! lifecycle of the single outstanding request.

use shared::{
    domain::{AcquisitionMode, ClassificationOutcome, ManualField, ManualParameters, RequestGeneration},
    error::{AnalysisError, ValidationError},
};
use tracing::{debug, info, warn};

use crate::{dataset::DatasetFile, dispatcher::ClassificationBackend};

pub const INITIAL_CATALOG_IDENTIFIER: &str = "Kepler-186";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadSource {
    File(DatasetFile),
    BundledDefault,
}

/// One request per mode, built on submit and consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisRequest {
    Upload(UploadSource),
    CatalogLookup { identifier: String },
    ManualEntry(ManualParameters),
}

impl AnalysisRequest {
    pub fn mode(&self) -> AcquisitionMode {
        match self {
            AnalysisRequest::Upload(_) => AcquisitionMode::Upload,
            AnalysisRequest::CatalogLookup { .. } => AcquisitionMode::CatalogLookup,
            AnalysisRequest::ManualEntry(_) => AcquisitionMode::ManualEntry,
        }
    }
}

/// A submitted request tagged with the generation it must complete under.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAnalysis {
    pub generation: RequestGeneration,
    pub request: AnalysisRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct UploadForm {
    attached: Option<DatasetFile>,
    use_bundled_default: bool,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self {
            attached: None,
            use_bundled_default: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ManualForm {
    values: [String; ManualField::COUNT],
}

impl Default for ManualForm {
    fn default() -> Self {
        Self {
            values: ManualField::ALL.map(|field| field.initial_value().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestPhase {
    Idle,
    InFlight(RequestGeneration),
}

#[derive(Debug, Clone)]
pub struct AcquisitionController {
    mode: AcquisitionMode,
    upload: UploadForm,
    identifier: String,
    manual: ManualForm,
    phase: RequestPhase,
    outcome: Option<ClassificationOutcome>,
    generation: RequestGeneration,
}

impl Default for AcquisitionController {
    fn default() -> Self {
        Self::new()
    }
}

impl AcquisitionController {
    pub fn new() -> Self {
        Self {
            mode: AcquisitionMode::Upload,
            upload: UploadForm::default(),
            identifier: INITIAL_CATALOG_IDENTIFIER.to_string(),
            manual: ManualForm::default(),
            phase: RequestPhase::Idle,
            outcome: None,
            generation: RequestGeneration(0),
        }
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    /// Explicit mode selection. Clears the live outcome and loading state and
    /// retires any in-flight request; typed inputs survive the switch.
    pub fn switch_mode(&mut self, mode: AcquisitionMode) {
        let previous = self.mode;
        self.mode = mode;
        self.invalidate();
        info!(from = %previous, to = %mode, generation = self.generation.0, "analysis: mode switched");
    }

    /// Drops the live outcome and any in-flight request without changing mode.
    pub fn reset(&mut self) {
        self.invalidate();
        debug!(generation = self.generation.0, "analysis: state reset");
    }

    fn invalidate(&mut self) {
        self.outcome = None;
        self.phase = RequestPhase::Idle;
        self.generation = self.generation.next();
    }

    pub fn attached_file(&self) -> Option<&DatasetFile> {
        self.upload.attached.as_ref()
    }

    pub fn uses_bundled_default(&self) -> bool {
        self.upload.use_bundled_default
    }

    /// Attaching a file replaces the bundled-default choice.
    pub fn attach_file(&mut self, file: DatasetFile) {
        debug!(file = %file.file_name, bytes = file.size_bytes(), "analysis: file attached");
        self.upload.attached = Some(file);
        self.upload.use_bundled_default = false;
        self.outcome = None;
    }

    pub fn set_use_bundled_default(&mut self, use_default: bool) {
        self.upload.use_bundled_default = use_default;
        if use_default {
            self.upload.attached = None;
        }
    }

    pub fn clear_attachment(&mut self) {
        self.upload.attached = None;
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn identifier_mut(&mut self) -> &mut String {
        &mut self.identifier
    }

    pub fn set_identifier(&mut self, identifier: impl Into<String>) {
        self.identifier = identifier.into();
    }

    pub fn clear_identifier(&mut self) {
        self.identifier.clear();
    }

    pub fn manual_text(&self, field: ManualField) -> &str {
        &self.manual.values[field.index()]
    }

    pub fn manual_text_mut(&mut self, field: ManualField) -> &mut String {
        &mut self.manual.values[field.index()]
    }

    pub fn set_manual_text(&mut self, field: ManualField, text: impl Into<String>) {
        self.manual.values[field.index()] = text.into();
    }

    pub fn reset_manual_fields(&mut self) {
        self.manual = ManualForm::default();
    }

    /// Current manual inputs as numbers, using the same coercion as submit.
    pub fn manual_parameters(&self) -> ManualParameters {
        parse_manual_fields(&self.manual.values).0
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.phase, RequestPhase::InFlight(_))
    }

    pub fn generation(&self) -> RequestGeneration {
        self.generation
    }

    /// The live successful outcome, if any. Failures are reported by
    /// [`Self::error`] instead, never both.
    pub fn outcome(&self) -> Option<&ClassificationOutcome> {
        self.outcome.as_ref().filter(|o| !o.is_failure())
    }

    pub fn error(&self) -> Option<&AnalysisError> {
        self.outcome.as_ref().and_then(ClassificationOutcome::failure)
    }

    /// Validates the active mode's inputs and builds its request. Validation
    /// failures are rejected before any network call and become the visible
    /// error.
    pub fn submit(&mut self) -> Result<PendingAnalysis, ValidationError> {
        if self.is_loading() {
            return Err(ValidationError::Busy);
        }

        let request = match self.build_request() {
            Ok(request) => request,
            Err(err) => {
                info!(mode = %self.mode, "analysis: rejected before dispatch: {err}");
                self.outcome = Some(ClassificationOutcome::Failure(err.clone().into()));
                return Err(err);
            }
        };

        self.outcome = None;
        self.generation = self.generation.next();
        self.phase = RequestPhase::InFlight(self.generation);
        info!(mode = %self.mode, generation = self.generation.0, "analysis: submitted");

        Ok(PendingAnalysis {
            generation: self.generation,
            request,
        })
    }

    fn build_request(&self) -> Result<AnalysisRequest, ValidationError> {
        match self.mode {
            AcquisitionMode::Upload => match (&self.upload.attached, self.upload.use_bundled_default) {
                (Some(file), _) => Ok(AnalysisRequest::Upload(UploadSource::File(file.clone()))),
                (None, true) => Ok(AnalysisRequest::Upload(UploadSource::BundledDefault)),
                (None, false) => Err(ValidationError::NoDataset),
            },
            AcquisitionMode::CatalogLookup => {
                let identifier = self.identifier.trim();
                if identifier.is_empty() {
                    return Err(ValidationError::EmptyIdentifier);
                }
                Ok(AnalysisRequest::CatalogLookup {
                    identifier: identifier.to_string(),
                })
            }
            AcquisitionMode::ManualEntry => {
                let (parameters, coerced) = parse_manual_fields(&self.manual.values);
                if !coerced.is_empty() {
                    let keys: Vec<_> = coerced.iter().map(|f| f.key()).collect();
                    warn!(fields = ?keys, "analysis: unparseable manual fields sent as 0");
                }
                Ok(AnalysisRequest::ManualEntry(parameters))
            }
        }
    }

    /// Applies a resolved outcome. Returns `false` and drops the outcome when
    /// `generation` was retired by a mode switch, reset, or newer submit.
    pub fn complete(&mut self, generation: RequestGeneration, outcome: ClassificationOutcome) -> bool {
        if self.phase != RequestPhase::InFlight(generation) {
            warn!(
                generation = generation.0,
                current = self.generation.0,
                outcome = outcome.kind_name(),
                "analysis: discarding stale outcome"
            );
            return false;
        }

        info!(
            mode = %self.mode,
            generation = generation.0,
            outcome = outcome.kind_name(),
            "analysis: completed"
        );
        self.phase = RequestPhase::Idle;
        self.outcome = Some(outcome);
        true
    }

    /// Submit, dispatch and apply in one step for callers that own the
    /// controller exclusively for the duration of the call.
    pub async fn run<B>(&mut self, backend: &B) -> Result<&ClassificationOutcome, ValidationError>
    where
        B: ClassificationBackend + ?Sized,
    {
        let pending = self.submit()?;
        let outcome = backend.dispatch(pending.request).await;
        self.complete(pending.generation, outcome);
        self.outcome.as_ref().ok_or(ValidationError::Busy)
    }
}

/// Parses each manual field independently. Text that is not a finite number
/// becomes `0`; the affected fields are returned alongside.
pub fn parse_manual_fields(
    values: &[String; ManualField::COUNT],
) -> (ManualParameters, Vec<ManualField>) {
    let mut coerced = Vec::new();
    let numbers = ManualField::ALL.map(|field| {
        match values[field.index()].trim().parse::<f64>() {
            Ok(value) if value.is_finite() => value,
            _ => {
                coerced.push(field);
                0.0
            }
        }
    });
    (ManualParameters::from_values(numbers), coerced)
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
