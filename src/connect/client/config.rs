use super::cookie::CookieStore;
use crate::error::ConnectError;
use directories::ProjectDirs;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub const DEFAULT_BASE_URL: &str = "https://connect.monstercat.com";
const COOKIE_FILE: &str = "connect.cookies";

#[derive(Debug, Clone)]
pub struct ConnectConfig {
    pub base_url: String,
    pub data_dir: PathBuf,
    /// Connect timeout only; reads are never timed out.
    pub connect_timeout_secs: Option<u64>,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            data_dir: default_data_dir(),
            connect_timeout_secs: None,
        }
    }
}

impl ConnectConfig {
    pub fn cookie_path(&self) -> PathBuf {
        self.data_dir.join(COOKIE_FILE)
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

pub fn default_data_dir() -> PathBuf {
    ProjectDirs::from("com", "monstercat", "connect-downloader")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("connect-downloader"))
}

/// Loads the cookie jar at `path`. A missing file yields an empty store and
/// `false`.
pub fn load_cookies(path: &Path) -> Result<(CookieStore, bool), ConnectError> {
    if !path.is_file() {
        tracing::debug!(path = %path.display(), "no cookie jar");
        return Ok((CookieStore::new(), false));
    }
    let text = fs::read_to_string(path).map_err(ConnectError::Io)?;
    let store = CookieStore::parse_netscape(&text)?;
    tracing::info!(path = %path.display(), cookies = store.len(), "cookie jar loaded");
    Ok((store, true))
}

/// Writes the cookie jar to `path`, replacing any existing file.
pub fn save_cookies(store: &CookieStore, path: &Path) -> Result<(), ConnectError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(ConnectError::Io)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(ConnectError::Io)?;
    tmp.write_all(store.to_netscape().as_bytes())
        .map_err(ConnectError::Io)?;
    tmp.persist(path).map_err(|e| ConnectError::Io(e.error))?;

    tracing::info!(path = %path.display(), cookies = store.len(), "cookie jar saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let cfg = ConnectConfig {
            base_url: "http://127.0.0.1:9000/".to_owned(),
            data_dir: PathBuf::from("/tmp/x"),
            connect_timeout_secs: None,
        };
        assert_eq!(cfg.endpoint("/tracks"), "http://127.0.0.1:9000/tracks");
        assert_eq!(cfg.endpoint("session"), "http://127.0.0.1:9000/session");
        assert_eq!(cfg.cookie_path(), PathBuf::from("/tmp/x/connect.cookies"));
    }

    #[test]
    fn missing_jar_is_not_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (store, found) = load_cookies(&dir.path().join("nope.cookies")).unwrap();
        assert!(!found);
        assert!(store.is_empty());
    }

    #[test]
    fn save_creates_directory_and_overwrites() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("connect.cookies");

        let mut store = CookieStore::parse_netscape(
            "example.com\tFALSE\t/\tFALSE\t0\ta\t1\n",
        )
        .unwrap();
        save_cookies(&store, &path).unwrap();

        store.clear();
        save_cookies(&store, &path).unwrap();

        let (loaded, found) = load_cookies(&path).unwrap();
        assert!(found);
        assert!(loaded.is_empty());
    }
}
