pub mod animation;
pub mod config;
pub mod controller;
pub mod dataset;
pub mod dispatcher;
pub mod geometry;
pub mod normalizer;
pub mod presenter;
pub mod selection;

pub use animation::{OrbitAnimation, OrbitFrame, RunningFlag, FRAME_INTERVAL};
pub use config::{load_settings, load_settings_from, ConfigError, Settings};
pub use controller::{
    AcquisitionController, AnalysisRequest, PendingAnalysis, UploadSource,
    INITIAL_CATALOG_IDENTIFIER,
};
pub use dataset::{load_precomputed_results, DatasetError, DatasetFile};
pub use dispatcher::{ClassificationBackend, DispatchError, HttpDispatcher};
pub use geometry::{compute_geometry, StarColor, TransitGeometry, TransitInputs};
pub use selection::{CandidateDetail, CandidateEntry, CandidateSelector, DetailView};
