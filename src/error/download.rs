//! Download errors

use reqwest::StatusCode;
use std::path::PathBuf;

use super::ConnectError;

/// Failures of a single file download. Cancellation is not an error, see
/// `DownloadOutcome::Cancelled`.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// No usable `filename=` in the `content-disposition` header.
    #[error("response has no filename (content-disposition missing or malformed)")]
    NoFilename,

    /// `Content-Length` missing, unparsable or zero.
    #[error("response has no content length")]
    NoLength,

    /// Network-level failure while streaming the body.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {status}: {url}")]
    Status { status: StatusCode, url: String },

    #[error("failed to create file ({path}): {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write file ({path}): {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Session(#[from] ConnectError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_display() {
        assert_eq!(
            DownloadError::NoLength.to_string(),
            "response has no content length"
        );
        let err = DownloadError::Status {
            status: StatusCode::FORBIDDEN,
            url: "http://example.com/album/1/download".to_owned(),
        };
        assert!(err.to_string().contains("403"));
    }
}
