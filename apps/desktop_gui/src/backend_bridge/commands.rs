//! Backend commands queued from UI to backend worker.

use std::path::PathBuf;

use client_core::AnalysisRequest;
use shared::domain::RequestGeneration;

pub enum BackendCommand {
    Analyze {
        generation: RequestGeneration,
        request: AnalysisRequest,
    },
    ReadDataset {
        path: PathBuf,
    },
    LoadDashboard {
        path: PathBuf,
    },
    FetchStarImage {
        url: String,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Analyze { .. } => "analyze",
            BackendCommand::ReadDataset { .. } => "read_dataset",
            BackendCommand::LoadDashboard { .. } => "load_dashboard",
            BackendCommand::FetchStarImage { .. } => "fetch_star_image",
        }
    }
}
