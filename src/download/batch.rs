use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{CancelToken, DownloadOutcome, download};
use crate::connect::{DownloadFormat, Session};
use crate::error::AppError;

/// What a batch does when one album fails for a reason other than
/// cancellation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Record the failure and move on to the next album.
    #[default]
    Continue,
    /// Stop the batch at the first failure.
    Halt,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    Started {
        index: usize,
        total: usize,
        album_id: String,
    },
    Progress {
        index: usize,
        percent: u8,
    },
    Finished {
        index: usize,
        path: PathBuf,
    },
    Failed {
        index: usize,
        album_id: String,
        message: String,
    },
    Cancelled {
        index: usize,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub completed: Vec<PathBuf>,
    /// `(album_id, message)`
    pub failed: Vec<(String, String)>,
    pub cancelled: bool,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        !self.cancelled && self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct BatchRequest<'a> {
    pub album_ids: &'a [String],
    pub format: DownloadFormat,
    pub dest_dir: &'a Path,
    pub policy: FailurePolicy,
}

/// Reads a batch file: a JSON array of album-id strings.
pub fn load_album_ids(path: &Path) -> Result<Vec<String>, AppError> {
    let bytes = fs::read(path)?;
    let ids: Vec<String> = serde_json::from_slice(&bytes)?;
    tracing::info!(path = %path.display(), count = ids.len(), "album ids loaded");
    Ok(ids)
}

/// Downloads the albums one at a time, in input order. The first
/// cancellation ends the batch.
pub async fn run_batch(
    session: &mut Session,
    req: &BatchRequest<'_>,
    cancel: &CancelToken,
    mut on_event: impl FnMut(BatchEvent),
) -> BatchReport {
    let total = req.album_ids.len();
    let mut report = BatchReport::default();
    tracing::info!(total, format = %req.format, policy = ?req.policy, "batch started");

    for (index, album_id) in req.album_ids.iter().enumerate() {
        if cancel.is_cancelled() {
            report.cancelled = true;
            on_event(BatchEvent::Cancelled { index });
            break;
        }

        on_event(BatchEvent::Started {
            index,
            total,
            album_id: album_id.clone(),
        });
        let url = session.album_download_url(album_id, req.format);
        let result = download(
            session,
            &url,
            req.dest_dir,
            |percent| on_event(BatchEvent::Progress { index, percent }),
            cancel,
        )
        .await;

        match result {
            Ok(DownloadOutcome::Completed(path)) => {
                on_event(BatchEvent::Finished {
                    index,
                    path: path.clone(),
                });
                report.completed.push(path);
            }
            Ok(DownloadOutcome::Cancelled) => {
                report.cancelled = true;
                on_event(BatchEvent::Cancelled { index });
                break;
            }
            Err(e) => {
                tracing::warn!(index, album_id = %album_id, err = %e, "album download failed");
                let message = e.to_string();
                on_event(BatchEvent::Failed {
                    index,
                    album_id: album_id.clone(),
                    message: message.clone(),
                });
                report.failed.push((album_id.clone(), message));
                if req.policy == FailurePolicy::Halt {
                    break;
                }
            }
        }
    }

    tracing::info!(
        completed = report.completed.len(),
        failed = report.failed.len(),
        cancelled = report.cancelled,
        "batch finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_album_ids_reads_json_array() {
        let dir = tempfile::tempdir().expect("tempdir");
        let p = dir.path().join("ids.json");
        fs::write(&p, br#"["a1", "b2"]"#).unwrap();
        assert_eq!(load_album_ids(&p).unwrap(), ["a1", "b2"]);
    }

    #[test]
    fn load_album_ids_rejects_non_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let p = dir.path().join("ids.json");
        fs::write(&p, b"a1,b2").unwrap();
        assert!(matches!(load_album_ids(&p), Err(AppError::Serde(_))));
        assert!(matches!(
            load_album_ids(&dir.path().join("missing.json")),
            Err(AppError::Io(_))
        ));
    }

    #[test]
    fn report_success() {
        assert!(BatchReport::default().is_success());
        let r = BatchReport {
            cancelled: true,
            ..Default::default()
        };
        assert!(!r.is_success());
    }

    #[test]
    fn policy_serde_names() {
        assert_eq!(
            serde_json::to_string(&FailurePolicy::Halt).unwrap(),
            "\"halt\""
        );
        assert_eq!(FailurePolicy::default(), FailurePolicy::Continue);
    }
}
