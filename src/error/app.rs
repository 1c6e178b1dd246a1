//! Application-level errors

use super::{ConnectError, DownloadError};

/// Top-level error returned from `main`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Connect(#[from] ConnectError),

    #[error("download failed: {0}")]
    Download(#[from] DownloadError),

    /// The stored session is not (or no longer) authenticated.
    #[error("not signed in: {0}")]
    NotSignedIn(String),

    #[error("{0}")]
    Other(String),
}

/// Settings store errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("failed to save settings: {source}")]
    Save {
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode settings: {source}")]
    Encode {
        #[source]
        source: serde_json::Error,
    },
}
