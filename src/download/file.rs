use std::path::{Path, PathBuf};

use futures_util::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_LENGTH, HeaderMap};
use tokio::io::AsyncWriteExt;

use super::CancelToken;
use crate::connect::Session;
use crate::error::{ConnectError, DownloadError};

pub const CHUNK_SIZE: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Completed(PathBuf),
    /// Stopped on request; the partial file has been removed.
    Cancelled,
}

enum Step {
    Continue,
    Cancelled,
}

/// Writes fixed-size chunks to the output file and tracks progress.
struct ChunkSink {
    file: tokio::fs::File,
    path: PathBuf,
    total: u64,
    written: u64,
    last_percent: u8,
}

impl ChunkSink {
    async fn write_chunk(
        &mut self,
        chunk: &[u8],
        on_progress: &mut impl FnMut(u8),
        cancel: &CancelToken,
    ) -> Result<Step, DownloadError> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|source| DownloadError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.written += chunk.len() as u64;

        let percent = percent_of(self.written, self.total);
        if percent != self.last_percent {
            self.last_percent = percent;
            on_progress(percent);
        }

        if cancel.is_cancelled() {
            Ok(Step::Cancelled)
        } else {
            Ok(Step::Continue)
        }
    }

    async fn discard(self) {
        drop(self.file);
        if let Err(e) = tokio::fs::remove_file(&self.path).await {
            tracing::warn!(path = %self.path.display(), err = %e, "failed to remove partial file");
        }
    }
}

/// Streams `url` into `dest_dir`, naming the file after the server's
/// `content-disposition`. Progress is reported as whole percentages, only
/// when the value changes. The cancel token is polled after every chunk.
pub async fn download(
    session: &mut Session,
    url: &str,
    dest_dir: &Path,
    mut on_progress: impl FnMut(u8),
    cancel: &CancelToken,
) -> Result<DownloadOutcome, DownloadError> {
    let resp = session.get(url).await.map_err(|e| match e {
        ConnectError::Transport(t) => DownloadError::Transport(t),
        other => DownloadError::Session(other),
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            status,
            url: url.to_owned(),
        });
    }

    let filename = header_filename(resp.headers()).ok_or(DownloadError::NoFilename)?;
    let total = header_length(resp.headers()).ok_or(DownloadError::NoLength)?;

    tokio::fs::create_dir_all(dest_dir)
        .await
        .map_err(|source| DownloadError::CreateFile {
            path: dest_dir.to_path_buf(),
            source,
        })?;
    let path = dest_dir.join(&filename);
    let file = tokio::fs::File::create(&path)
        .await
        .map_err(|source| DownloadError::CreateFile {
            path: path.clone(),
            source,
        })?;
    tracing::info!(path = %path.display(), total, "download started");

    let mut sink = ChunkSink {
        file,
        path,
        total,
        written: 0,
        last_percent: 0,
    };
    let mut stream = resp.bytes_stream();
    let mut pending = Vec::<u8>::with_capacity(CHUNK_SIZE * 2);
    let mut finished = false;

    while !finished {
        match stream.next().await {
            Some(Ok(bytes)) => pending.extend_from_slice(&bytes),
            Some(Err(e)) => {
                tracing::warn!(url, err = %e, "download stream failed");
                sink.discard().await;
                return Err(DownloadError::Transport(e));
            }
            None => finished = true,
        }

        // Full chunks while streaming; the short tail once the body has ended.
        let mut offset = 0;
        while pending.len() - offset >= CHUNK_SIZE || (finished && offset < pending.len()) {
            let end = (offset + CHUNK_SIZE).min(pending.len());
            let step = match sink
                .write_chunk(&pending[offset..end], &mut on_progress, cancel)
                .await
            {
                Ok(step) => step,
                Err(e) => {
                    sink.discard().await;
                    return Err(e);
                }
            };
            offset = end;

            if let Step::Cancelled = step {
                tracing::info!(path = %sink.path.display(), written = sink.written, "download cancelled");
                sink.discard().await;
                return Ok(DownloadOutcome::Cancelled);
            }
        }
        pending.drain(..offset);
    }

    if let Err(source) = sink.file.flush().await {
        let path = sink.path.clone();
        sink.discard().await;
        return Err(DownloadError::Write { path, source });
    }
    if sink.written != sink.total {
        tracing::warn!(
            written = sink.written,
            expected = sink.total,
            "body size differs from Content-Length"
        );
    }

    tracing::info!(path = %sink.path.display(), bytes = sink.written, "download finished");
    Ok(DownloadOutcome::Completed(sink.path))
}

fn percent_of(written: u64, total: u64) -> u8 {
    ((written as f64) * 100.0 / (total as f64)).round().min(100.0) as u8
}

fn header_filename(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .and_then(filename_from_content_disposition)
}

fn header_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<u64>().ok())
        .filter(|n| *n > 0)
}

/// The value after the first `filename=`, up to `;`, without quotes and with
/// path separators replaced.
pub fn filename_from_content_disposition(value: &str) -> Option<String> {
    const KEY: &str = "filename=";
    let start = value.find(KEY)? + KEY.len();
    let raw = value[start..].split(';').next()?.replace('"', "");
    let name = sanitize_filename(&raw);
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name)
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_is_unquoted() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="Rogue - Tokyo.mp3""#)
                .as_deref(),
            Some("Rogue - Tokyo.mp3")
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename=album.zip").as_deref(),
            Some("album.zip")
        );
    }

    #[test]
    fn filename_stops_at_next_parameter() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="a.flac"; size=10"#)
                .as_deref(),
            Some("a.flac")
        );
    }

    #[test]
    fn filename_cannot_escape_directory() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="../../etc/passwd""#)
                .as_deref(),
            Some(".._.._etc_passwd")
        );
        assert_eq!(filename_from_content_disposition("filename=.."), None);
    }

    #[test]
    fn filename_missing_or_empty() {
        assert_eq!(filename_from_content_disposition("attachment"), None);
        assert_eq!(filename_from_content_disposition(r#"attachment; filename="""#), None);
        assert_eq!(filename_from_content_disposition("inline; filename*=UTF-8''x.mp3"), None);
    }

    #[test]
    fn percent_rounds_and_caps() {
        assert_eq!(percent_of(8192, 100_000), 8);
        assert_eq!(percent_of(24_576, 100_000), 25);
        assert_eq!(percent_of(100_000, 100_000), 100);
        assert_eq!(percent_of(150, 100), 100);
    }
}
