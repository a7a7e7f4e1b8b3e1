use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::AnalysisError, protocol::StellarRecord};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);
    };
}

id_newtype!(RequestGeneration);
id_newtype!(CollectionId);

impl RequestGeneration {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl CollectionId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionMode {
    #[default]
    Upload,
    CatalogLookup,
    ManualEntry,
}

impl AcquisitionMode {
    pub const ALL: [AcquisitionMode; 3] = [
        AcquisitionMode::Upload,
        AcquisitionMode::CatalogLookup,
        AcquisitionMode::ManualEntry,
    ];

    pub fn label(self) -> &'static str {
        match self {
            AcquisitionMode::Upload => "Upload Data",
            AcquisitionMode::CatalogLookup => "Star ID",
            AcquisitionMode::ManualEntry => "Manual Entry",
        }
    }
}

impl fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcquisitionMode::Upload => "upload",
            AcquisitionMode::CatalogLookup => "catalog_lookup",
            AcquisitionMode::ManualEntry => "manual_entry",
        };
        f.write_str(name)
    }
}

/// Classification label attached to a processed row or a single prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PredictionLabel {
    Confirmed,
    Candidate,
    FalsePositive,
    #[default]
    Unknown,
}

impl PredictionLabel {
    /// Accepts the spellings the classification service is known to emit.
    /// Anything else is not a recognized label.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "CONFIRMED" => Some(PredictionLabel::Confirmed),
            "CANDIDATE" => Some(PredictionLabel::Candidate),
            "FALSE POSITIVE" => Some(PredictionLabel::FalsePositive),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PredictionLabel::Confirmed => "CONFIRMED",
            PredictionLabel::Candidate => "CANDIDATE",
            PredictionLabel::FalsePositive => "FALSE_POSITIVE",
            PredictionLabel::Unknown => "UNKNOWN",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PredictionLabel::Confirmed => "Exoplanet (Confirmed)",
            PredictionLabel::Candidate => "Planetary Candidate",
            PredictionLabel::FalsePositive => "False Positive",
            PredictionLabel::Unknown => "Not an Exoplanet",
        }
    }
}

impl fmt::Display for PredictionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    #[serde(rename = "CONFIRMED")]
    Confirmed,
    #[serde(rename = "FALSE POSITIVE", alias = "FALSE_POSITIVE")]
    FalsePositive,
}

impl Disposition {
    pub fn as_str(self) -> &'static str {
        match self {
            Disposition::Confirmed => "CONFIRMED",
            Disposition::FalsePositive => "FALSE POSITIVE",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a precomputed results collection. `name` is unique within a
/// collection and is what list rows are keyed by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetCandidate {
    #[serde(rename = "kepler_name")]
    pub name: String,
    #[serde(rename = "koi_disposition")]
    pub disposition: Disposition,
    #[serde(rename = "koi_score")]
    pub score: f64,
    #[serde(rename = "koi_period")]
    pub orbital_period_days: f64,
    #[serde(rename = "koi_prad")]
    pub planet_radius_earth_radii: f64,
    #[serde(rename = "koi_impact")]
    pub impact_parameter: f64,
    #[serde(rename = "koi_depth")]
    pub transit_depth_ppm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_rows_processed: u64,
    pub exoplanets_found: u64,
    pub errors: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_exoplanets: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowResult {
    pub row_number: u32,
    pub label: PredictionLabel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub probabilities: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub summary: BatchSummary,
    pub rows: Vec<RowResult>,
}

/// The single live result of an acquisition. A new outcome always replaces
/// the previous one wholesale.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationOutcome {
    Batch(BatchOutcome),
    Stellar(StellarRecord),
    SinglePrediction { label: Option<PredictionLabel> },
    Failure(AnalysisError),
}

impl ClassificationOutcome {
    pub fn failure(&self) -> Option<&AnalysisError> {
        match self {
            ClassificationOutcome::Failure(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.failure().is_some()
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ClassificationOutcome::Batch(_) => "batch",
            ClassificationOutcome::Stellar(_) => "stellar",
            ClassificationOutcome::SinglePrediction { .. } => "single_prediction",
            ClassificationOutcome::Failure(_) => "failure",
        }
    }
}

/// The fixed, ordered parameter set accepted by the single-prediction
/// endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManualField {
    Period,
    Time0Bk,
    Duration,
    Depth,
    Impact,
    ModelSnr,
    PlanetRadius,
    StellarTeff,
    StellarRadius,
    StellarLogg,
    Score,
    PdispositionBin,
}

impl ManualField {
    pub const COUNT: usize = 12;

    pub const ALL: [ManualField; ManualField::COUNT] = [
        ManualField::Period,
        ManualField::Time0Bk,
        ManualField::Duration,
        ManualField::Depth,
        ManualField::Impact,
        ManualField::ModelSnr,
        ManualField::PlanetRadius,
        ManualField::StellarTeff,
        ManualField::StellarRadius,
        ManualField::StellarLogg,
        ManualField::Score,
        ManualField::PdispositionBin,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn key(self) -> &'static str {
        match self {
            ManualField::Period => "koi_period",
            ManualField::Time0Bk => "koi_time0bk",
            ManualField::Duration => "koi_duration",
            ManualField::Depth => "koi_depth",
            ManualField::Impact => "koi_impact",
            ManualField::ModelSnr => "koi_model_snr",
            ManualField::PlanetRadius => "koi_prad",
            ManualField::StellarTeff => "koi_steff",
            ManualField::StellarRadius => "koi_srad",
            ManualField::StellarLogg => "koi_slogg",
            ManualField::Score => "koi_score",
            ManualField::PdispositionBin => "koi_pdisposition_bin",
        }
    }

    /// Looks a field up by wire key; the `koi_` prefix is optional.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim();
        let bare = key.strip_prefix("koi_").unwrap_or(key);
        Self::ALL
            .into_iter()
            .find(|field| field.key().trim_start_matches("koi_") == bare)
    }

    /// Human label used by form renderers: the key without the `koi_` prefix.
    pub fn label(self) -> String {
        self.key().trim_start_matches("koi_").replacen('_', " ", 1)
    }

    pub fn initial_value(self) -> f64 {
        match self {
            ManualField::Period => 75.0,
            ManualField::Time0Bk => 0.0,
            ManualField::Duration => 4.0,
            ManualField::Depth => 23791.0,
            ManualField::Impact => 0.7,
            ManualField::ModelSnr => 10.0,
            ManualField::PlanetRadius => 1.0,
            ManualField::StellarTeff => 5778.0,
            ManualField::StellarRadius => 1.0,
            ManualField::StellarLogg => 4.4,
            ManualField::Score => 0.5,
            ManualField::PdispositionBin => 1.2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManualParameters {
    pub koi_period: f64,
    pub koi_time0bk: f64,
    pub koi_duration: f64,
    pub koi_depth: f64,
    pub koi_impact: f64,
    pub koi_model_snr: f64,
    pub koi_prad: f64,
    pub koi_steff: f64,
    pub koi_srad: f64,
    pub koi_slogg: f64,
    pub koi_score: f64,
    pub koi_pdisposition_bin: f64,
}

impl ManualParameters {
    pub fn from_values(values: [f64; ManualField::COUNT]) -> Self {
        Self {
            koi_period: values[ManualField::Period.index()],
            koi_time0bk: values[ManualField::Time0Bk.index()],
            koi_duration: values[ManualField::Duration.index()],
            koi_depth: values[ManualField::Depth.index()],
            koi_impact: values[ManualField::Impact.index()],
            koi_model_snr: values[ManualField::ModelSnr.index()],
            koi_prad: values[ManualField::PlanetRadius.index()],
            koi_steff: values[ManualField::StellarTeff.index()],
            koi_srad: values[ManualField::StellarRadius.index()],
            koi_slogg: values[ManualField::StellarLogg.index()],
            koi_score: values[ManualField::Score.index()],
            koi_pdisposition_bin: values[ManualField::PdispositionBin.index()],
        }
    }

    pub fn get(&self, field: ManualField) -> f64 {
        match field {
            ManualField::Period => self.koi_period,
            ManualField::Time0Bk => self.koi_time0bk,
            ManualField::Duration => self.koi_duration,
            ManualField::Depth => self.koi_depth,
            ManualField::Impact => self.koi_impact,
            ManualField::ModelSnr => self.koi_model_snr,
            ManualField::PlanetRadius => self.koi_prad,
            ManualField::StellarTeff => self.koi_steff,
            ManualField::StellarRadius => self.koi_srad,
            ManualField::StellarLogg => self.koi_slogg,
            ManualField::Score => self.koi_score,
            ManualField::PdispositionBin => self.koi_pdisposition_bin,
        }
    }
}

impl Default for ManualParameters {
    fn default() -> Self {
        Self::from_values(ManualField::ALL.map(ManualField::initial_value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    #[serde(rename = "Planetary Candidate")]
    PlanetaryCandidate,
    #[serde(rename = "Confirmed Exoplanet")]
    ConfirmedExoplanet,
    #[serde(rename = "False Positive")]
    FalsePositive,
}

impl Classification {
    pub fn headline(self) -> &'static str {
        match self {
            Classification::PlanetaryCandidate => "Planetary Candidate",
            Classification::ConfirmedExoplanet => "Confirmed Exoplanet",
            Classification::FalsePositive => "False Positive",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanetData {
    pub orbital_period: f64,
    pub planet_radius: f64,
    pub impact: f64,
    pub depth: f64,
}

/// A fully resolved single-target analysis: headline classification, the
/// host star record and the transit parameters used for the visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleAnalysisResult {
    pub classification: Classification,
    pub confidence: f64,
    pub stellar_data: StellarRecord,
    pub planet_data: PlanetData,
}
