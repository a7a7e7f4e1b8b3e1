//! Local static inputs: the bundled sample dataset and the precomputed
//! results collection consumed by the dashboard.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use shared::domain::PlanetCandidate;
use thiserror::Error;
use tracing::{info, warn};

pub const CSV_MIME: &str = "text/csv";

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("'{path}' is empty")]
    Empty { path: PathBuf },
    #[error("invalid results file '{path}': {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A CSV payload ready to be sent to the batch endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl DatasetFile {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    pub async fn read(path: &Path) -> Result<Self, DatasetError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| DatasetError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        if bytes.is_empty() {
            return Err(DatasetError::Empty {
                path: path.to_path_buf(),
            });
        }
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "dataset.csv".to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Reads the precomputed candidate list. Candidate names key the list, so a
/// repeated name keeps its first occurrence only.
pub async fn load_precomputed_results(path: &Path) -> Result<Vec<PlanetCandidate>, DatasetError> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|source| DatasetError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let candidates: Vec<PlanetCandidate> =
        serde_json::from_slice(&raw).map_err(|source| DatasetError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let total = candidates.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<PlanetCandidate> = candidates
        .into_iter()
        .filter(|candidate| {
            let fresh = seen.insert(candidate.name.clone());
            if !fresh {
                warn!(name = %candidate.name, "dataset: dropping duplicate candidate");
            }
            fresh
        })
        .collect();

    info!(
        path = %path.display(),
        candidates = unique.len(),
        dropped = total - unique.len(),
        "dataset: precomputed results loaded"
    );
    Ok(unique)
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        std::env::temp_dir().join(format!("exoscope_dataset_{suffix}_{name}"))
    }

    #[tokio::test]
    async fn reads_dataset_file_name_and_bytes() {
        let path = temp_path("default.csv");
        fs::write(&path, "koi_period,koi_impact,koi_depth\n9.48,0.146,615.8\n").expect("write");

        let file = DatasetFile::read(&path).await.expect("read");
        assert!(file.file_name.ends_with("default.csv"));
        assert!(file.size_bytes() > 0);

        fs::remove_file(path).expect("cleanup");
    }

    #[tokio::test]
    async fn empty_dataset_is_rejected() {
        let path = temp_path("empty.csv");
        fs::write(&path, "").expect("write");
        let err = DatasetFile::read(&path).await.expect_err("empty");
        assert!(matches!(err, DatasetError::Empty { .. }));
        fs::remove_file(path).expect("cleanup");
    }

    #[tokio::test]
    async fn precomputed_results_keep_order_and_drop_duplicates() {
        let path = temp_path("result.json");
        fs::write(
            &path,
            r#"[
                {"kepler_name":"Kepler-22 b","koi_disposition":"CONFIRMED","koi_score":1.0,"koi_period":289.86,"koi_prad":2.38,"koi_impact":0.38,"koi_depth":492.0},
                {"kepler_name":"Kepler-7 b","koi_disposition":"CONFIRMED","koi_score":0.98,"koi_period":4.88,"koi_prad":16.1,"koi_impact":0.56,"koi_depth":6660.0},
                {"kepler_name":"Kepler-22 b","koi_disposition":"FALSE POSITIVE","koi_score":0.0,"koi_period":1.0,"koi_prad":1.0,"koi_impact":0.1,"koi_depth":10.0}
            ]"#,
        )
        .expect("write");

        let candidates = load_precomputed_results(&path).await.expect("load");
        let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Kepler-22 b", "Kepler-7 b"]);
        assert_eq!(candidates[0].score, 1.0);

        fs::remove_file(path).expect("cleanup");
    }

    #[tokio::test]
    async fn missing_results_file_reports_path() {
        let path = temp_path("missing.json");
        let err = load_precomputed_results(&path).await.expect_err("missing");
        assert!(err.to_string().contains("missing.json"));
    }
}
