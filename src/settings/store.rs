use crate::connect::DownloadFormat;
use crate::download::FailurePolicy;
use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Defaults remembered between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default)]
    pub format: DownloadFormat,
    #[serde(default)]
    pub download_dir: Option<PathBuf>,
    #[serde(default)]
    pub failure_policy: FailurePolicy,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            format: DownloadFormat::default(),
            download_dir: None,
            failure_policy: FailurePolicy::default(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

pub fn settings_path(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.json")
}

/// Missing or unreadable settings fall back to the defaults.
pub fn load_settings(data_dir: &Path) -> AppSettings {
    let p = settings_path(data_dir);
    let Ok(bytes) = fs::read(&p) else {
        return AppSettings::default();
    };
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        tracing::warn!(path = %p.display(), err = %e, "settings file unreadable, using defaults");
        AppSettings::default()
    })
}

pub fn save_settings(data_dir: &Path, s: &AppSettings) -> Result<(), SettingsError> {
    fs::create_dir_all(data_dir).map_err(|source| SettingsError::Save { source })?;
    let p = settings_path(data_dir);
    let tmp = p.with_extension("json.tmp");
    let bytes = serde_json::to_vec_pretty(s).map_err(|source| SettingsError::Encode { source })?;
    fs::write(&tmp, bytes).map_err(|source| SettingsError::Save { source })?;
    if let Err(e) = fs::rename(&tmp, &p) {
        let _ = fs::remove_file(&p);
        fs::rename(&tmp, &p).map_err(|_| SettingsError::Save { source: e })?;
    }
    Ok(())
}
