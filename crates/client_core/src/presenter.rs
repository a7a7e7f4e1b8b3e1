//! Display models for outcomes. Missing record fields are defaulted here, not
//! in the normalizer.

use std::fmt::Write as _;

use serde_json::Value;
use shared::{
    domain::{
        AcquisitionMode, BatchOutcome, Classification, ClassificationOutcome, Disposition,
        PredictionLabel, SingleAnalysisResult,
    },
    error::AnalysisError,
    protocol::StellarRecord,
};

use crate::geometry::{compute_geometry, TransitGeometry, TransitInputs};

pub const UNKNOWN_FIELD: &str = "Unknown";
pub const NO_PREDICTION: &str = "N/A";
pub const FAILURE_TITLE: &str = "Analysis Failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPlacement {
    /// Replaces the whole outcome pane.
    FullPane,
    /// Shown under the form, which stays visible.
    InlineBanner,
}

pub fn error_placement(mode: AcquisitionMode) -> ErrorPlacement {
    match mode {
        AcquisitionMode::Upload | AcquisitionMode::CatalogLookup => ErrorPlacement::FullPane,
        AcquisitionMode::ManualEntry => ErrorPlacement::InlineBanner,
    }
}

/// Colour family a renderer should use for a label or badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Positive,
    Caution,
    Negative,
    Muted,
}

pub fn label_tone(label: PredictionLabel) -> Tone {
    match label {
        PredictionLabel::Confirmed => Tone::Positive,
        PredictionLabel::Candidate => Tone::Caution,
        PredictionLabel::FalsePositive => Tone::Negative,
        PredictionLabel::Unknown => Tone::Muted,
    }
}

pub fn disposition_tone(disposition: Disposition) -> Tone {
    match disposition {
        Disposition::Confirmed => Tone::Positive,
        Disposition::FalsePositive => Tone::Negative,
    }
}

pub fn classification_tone(classification: Classification) -> Tone {
    match classification {
        Classification::ConfirmedExoplanet => Tone::Positive,
        Classification::PlanetaryCandidate => Tone::Caution,
        Classification::FalsePositive => Tone::Negative,
    }
}

/// Text for a single prediction; an absent label reads `N/A`.
pub fn prediction_text(label: Option<PredictionLabel>) -> String {
    match label {
        Some(label) => label.as_str().replace('_', " "),
        None => NO_PREDICTION.to_string(),
    }
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => UNKNOWN_FIELD.to_string(),
        Some(Value::String(text)) if text.trim().is_empty() => UNKNOWN_FIELD.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn text_or_unknown(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => UNKNOWN_FIELD.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StellarView {
    pub name: String,
    pub image_url: Option<String>,
    pub spectral_type: String,
    pub number_of_stars: String,
    pub number_of_planets: String,
    pub constellation: String,
    pub distance: String,
    pub star_radius: String,
}

impl StellarView {
    pub fn from_record(record: &StellarRecord) -> Self {
        Self {
            name: text_or_unknown(record.name.as_deref()),
            image_url: record
                .image_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            spectral_type: text_or_unknown(record.spectral_type.as_deref()),
            number_of_stars: field_text(record.number_of_stars.as_ref()),
            number_of_planets: field_text(record.number_of_planets.as_ref()),
            constellation: text_or_unknown(record.constellation.as_deref()),
            distance: text_or_unknown(record.distance.as_deref()),
            star_radius: field_text(record.star_radius.as_ref()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        vec![
            format!("System has {} star(s)", self.number_of_stars),
            format!("{} confirmed planet(s)", self.number_of_planets),
            format!("In the {} constellation", self.constellation),
            format!("Distance: {}", self.distance),
            format!("Spectral type: {}", self.spectral_type),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRowView {
    pub row_number: u32,
    pub text: String,
    pub tone: Tone,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchView {
    pub rows_processed: u64,
    pub exoplanets_found: u64,
    pub errors: u64,
    pub rows: Vec<BatchRowView>,
}

impl BatchView {
    pub fn from_outcome(batch: &BatchOutcome) -> Self {
        let rows = batch
            .rows
            .iter()
            .map(|row| match row.error.as_deref() {
                Some(error) => BatchRowView {
                    row_number: row.row_number,
                    text: format!("Error: {error}"),
                    tone: Tone::Negative,
                    is_error: true,
                },
                None => BatchRowView {
                    row_number: row.row_number,
                    text: format!("Classification: {}", row.label.description()),
                    tone: label_tone(row.label),
                    is_error: false,
                },
            })
            .collect();
        Self {
            rows_processed: batch.summary.total_rows_processed,
            exoplanets_found: batch.summary.exoplanets_found,
            errors: batch.summary.errors,
            rows,
        }
    }
}

/// Single-target view: headline, confidence, transit geometry and stellar
/// context.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleResultView {
    pub headline: &'static str,
    pub tone: Tone,
    pub confidence_text: String,
    pub inputs: TransitInputs,
    pub geometry: TransitGeometry,
    pub stellar: StellarView,
}

impl SingleResultView {
    pub fn from_result(result: &SingleAnalysisResult) -> Self {
        let inputs = TransitInputs::from(&result.planet_data);
        Self {
            headline: result.classification.headline(),
            tone: classification_tone(result.classification),
            confidence_text: format!("Confidence Score: {}%", result.confidence),
            inputs,
            geometry: compute_geometry(inputs),
            stellar: StellarView::from_record(&result.stellar_data),
        }
    }
}

pub fn render_failure(error: &AnalysisError) -> String {
    format!("{FAILURE_TITLE}\n{}", error.message)
}

/// Plain-text rendering for terminals and logs.
pub fn render_outcome(outcome: &ClassificationOutcome) -> String {
    let mut out = String::new();
    match outcome {
        ClassificationOutcome::Batch(batch) => {
            let view = BatchView::from_outcome(batch);
            let _ = writeln!(out, "Batch Analysis Complete");
            let _ = writeln!(
                out,
                "Rows Processed: {}  Exoplanets Found: {}  Errors: {}",
                view.rows_processed, view.exoplanets_found, view.errors
            );
            for row in &view.rows {
                let _ = writeln!(out, "Row {:>4}  {}", row.row_number, row.text);
            }
        }
        ClassificationOutcome::Stellar(record) => {
            let view = StellarView::from_record(record);
            out.push_str(&render_stellar(&view));
        }
        ClassificationOutcome::SinglePrediction { label } => {
            let _ = writeln!(out, "Model Prediction: {}", prediction_text(*label));
        }
        ClassificationOutcome::Failure(error) => {
            let _ = writeln!(out, "{}", render_failure(error));
        }
    }
    out
}

fn render_stellar(view: &StellarView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.name);
    if let Some(url) = &view.image_url {
        let _ = writeln!(out, "Image: {url}");
    }
    for line in view.lines() {
        let _ = writeln!(out, "  {line}");
    }
    out
}

pub fn render_geometry(geometry: &TransitGeometry) -> String {
    format!(
        "radius ratio {:.4}, planet {:.1}px on a {:.1}px star ({}), orbit {:.1}px, offset {:.1}px, period {:.0}ms",
        geometry.radius_ratio,
        geometry.planet_diameter_px,
        geometry.star_diameter_px,
        geometry.star_color,
        geometry.orbit_diameter_px,
        geometry.vertical_offset_px,
        geometry.angular_period_ms,
    )
}

pub fn render_single_result(view: &SingleResultView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.headline);
    let _ = writeln!(out, "{}", view.confidence_text);
    let _ = writeln!(out, "Transit: {}", render_geometry(&view.geometry));
    out.push_str(&render_stellar(&view.stellar));
    out
}
