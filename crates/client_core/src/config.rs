use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "exoscope.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend url '{url}': {source}")]
    InvalidBackendUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("backend url '{0}' must use http or https")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Settings {
    pub backend_url: String,
    pub default_dataset_path: PathBuf,
    pub precomputed_results_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8000".into(),
            default_dataset_path: PathBuf::from("public/default.csv"),
            precomputed_results_path: PathBuf::from("public/result.json"),
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Parsed backend base URL; only http(s) is accepted.
    pub fn backend_base_url(&self) -> Result<Url, ConfigError> {
        let raw = self.backend_url.trim();
        let url = Url::parse(raw).map_err(|source| ConfigError::InvalidBackendUrl {
            url: raw.to_string(),
            source,
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(raw.to_string()));
        }
        Ok(url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Defaults, then `exoscope.toml` in the working directory, then environment.
pub fn load_settings() -> Settings {
    load_settings_from(Path::new(DEFAULT_CONFIG_FILE))
}

pub fn load_settings_from(config_path: &Path) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(config_path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => apply_file_overrides(&mut settings, &file_cfg),
            Err(err) => tracing::warn!(
                path = %config_path.display(),
                "ignoring unreadable config file: {err}"
            ),
        }
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    settings
}

fn apply_file_overrides(settings: &mut Settings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("backend_url") {
        settings.backend_url = v.clone();
    }
    if let Some(v) = file_cfg.get("default_dataset_path") {
        settings.default_dataset_path = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("precomputed_results_path") {
        settings.precomputed_results_path = PathBuf::from(v);
    }
    if let Some(v) = file_cfg.get("request_timeout_secs") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("EXOSCOPE_BACKEND_URL") {
        settings.backend_url = v;
    }
    if let Some(v) = var("APP__BACKEND_URL") {
        settings.backend_url = v;
    }

    if let Some(v) = var("EXOSCOPE_DEFAULT_DATASET") {
        settings.default_dataset_path = PathBuf::from(v);
    }
    if let Some(v) = var("EXOSCOPE_RESULTS_FILE") {
        settings.precomputed_results_path = PathBuf::from(v);
    }

    if let Some(v) = var("APP__REQUEST_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.request_timeout_secs = parsed;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("exoscope_config_test_{suffix}.toml"));
        fs::write(
            &path,
            "backend_url = \"http://10.0.0.5:9000\"\nrequest_timeout_secs = \"5\"\n",
        )
        .expect("write config");

        let mut settings = Settings::default();
        let raw = fs::read_to_string(&path).expect("read config");
        let file_cfg: HashMap<String, String> = toml::from_str(&raw).expect("parse");
        apply_file_overrides(&mut settings, &file_cfg);

        assert_eq!(settings.backend_url, "http://10.0.0.5:9000");
        assert_eq!(settings.request_timeout_secs, 5);
        assert_eq!(settings.default_dataset_path, PathBuf::from("public/default.csv"));

        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn app_prefixed_env_wins_over_plain_env() {
        let mut settings = Settings::default();
        apply_env_overrides(&mut settings, |name| match name {
            "EXOSCOPE_BACKEND_URL" => Some("http://plain:1".into()),
            "APP__BACKEND_URL" => Some("http://app:2".into()),
            "APP__REQUEST_TIMEOUT_SECS" => Some("not-a-number".into()),
            _ => None,
        });
        assert_eq!(settings.backend_url, "http://app:2");
        assert_eq!(settings.request_timeout_secs, 30);
    }

    #[test]
    fn rejects_non_http_backend_urls() {
        let settings = Settings {
            backend_url: "ftp://example.org".into(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.backend_base_url(),
            Err(ConfigError::UnsupportedScheme(_))
        ));

        let settings = Settings {
            backend_url: "not a url".into(),
            ..Settings::default()
        };
        assert!(matches!(
            settings.backend_base_url(),
            Err(ConfigError::InvalidBackendUrl { .. })
        ));
    }
}
