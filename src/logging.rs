use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_FILE_NAME: &str = "connect-downloader.log";
pub const DEFAULT_FILTER: &str = "info,reqwest=warn,hyper=warn";

/// Keeps the background log writer alive; drop it last.
pub struct LogGuard(#[allow(dead_code)] Option<WorkerGuard>);

#[derive(Debug, Clone, Default)]
pub struct LogConfig {
    pub dir: Option<PathBuf>,
    pub filter: Option<String>,
}

/// Resolves the log directory, falling back to a temp dir when the preferred
/// one cannot be created.
pub fn log_dir(data_dir: &Path, cfg: &LogConfig) -> PathBuf {
    let preferred = cfg.dir.clone().unwrap_or_else(|| data_dir.join("logs"));
    match fs::create_dir_all(&preferred) {
        Ok(()) => preferred,
        Err(_) => {
            let fallback = std::env::temp_dir().join("connect-downloader-logs");
            let _ = fs::create_dir_all(&fallback);
            fallback
        }
    }
}

fn filter(cfg: &LogConfig) -> EnvFilter {
    match cfg.filter.as_deref() {
        Some(s) if !s.trim().is_empty() => EnvFilter::new(s),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

pub fn init(data_dir: &Path, cfg: LogConfig) -> LogGuard {
    let dir = log_dir(data_dir, &cfg);

    let file_appender = tracing_appender::rolling::daily(&dir, LOG_FILE_NAME);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(file_writer);

    let subscriber = tracing_subscriber::registry()
        .with(filter(&cfg))
        .with(file_layer);

    let _ = subscriber.try_init();
    tracing::info!(log_dir = %dir.display(), "logging initialised");

    LogGuard(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_dir_defaults_under_data_dir() {
        let data = tempfile::tempdir().expect("tempdir");
        let dir = log_dir(data.path(), &LogConfig::default());
        assert_eq!(dir, data.path().join("logs"));
        assert!(dir.is_dir());
    }

    #[test]
    fn log_dir_override_wins() {
        let data = tempfile::tempdir().expect("tempdir");
        let custom = data.path().join("elsewhere");
        let cfg = LogConfig {
            dir: Some(custom.clone()),
            filter: None,
        };
        assert_eq!(log_dir(data.path(), &cfg), custom);
    }
}
