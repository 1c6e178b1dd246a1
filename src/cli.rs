use clap::{Parser, Subcommand, ValueEnum};
use connect_downloader::connect::DownloadFormat;
use connect_downloader::download::FailurePolicy;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "connect-downloader",
    version,
    about = "List and download Monstercat Connect releases"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Override the data directory (defaults to the platform data_local_dir)
    #[arg(long, global = true, env = "CONNECT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Override the log directory (defaults to `{data_dir}/logs`)
    #[arg(long, global = true, env = "CONNECT_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Override the log filter (same syntax as RUST_LOG)
    #[arg(long, global = true, env = "RUST_LOG")]
    pub log_filter: Option<String>,

    /// Override the service base URL
    #[arg(long, global = true, env = "CONNECT_BASE_URL")]
    pub base_url: Option<String>,

    #[arg(long, global = true, env = "CONNECT_EMAIL")]
    pub email: Option<String>,

    #[arg(long, global = true, env = "CONNECT_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Sign in with email and password
    Login {
        /// Keep the session cookies for later runs
        #[arg(long)]
        remember: bool,
    },

    /// Forget the stored session
    Logout,

    /// Report whether the stored session is signed in
    Status,

    /// Print the track list (default)
    Tracks {
        #[arg(long, value_enum)]
        sort: Option<SortColumn>,

        #[arg(long, requires = "sort")]
        desc: bool,
    },

    /// Download every album listed in a JSON array of ids
    Download {
        #[arg(long, short)]
        input: PathBuf,

        #[arg(long, value_enum)]
        format: Option<DownloadFormat>,

        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, value_enum)]
        policy: Option<FailurePolicy>,
    },

    /// Show or change the saved download defaults
    Settings {
        #[arg(long, value_enum)]
        format: Option<DownloadFormat>,

        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, value_enum)]
        policy: Option<FailurePolicy>,
    },
}

/// Table columns by name, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortColumn {
    Track,
    Artists,
    Release,
    Number,
    Length,
    Bpm,
    Genres,
    ReleaseDate,
}

impl SortColumn {
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_downloader::domain::HEADERS;

    #[test]
    fn sort_columns_follow_headers() {
        assert_eq!(SortColumn::value_variants().len(), HEADERS.len());
        assert_eq!(HEADERS[SortColumn::Length.index()], "Length");
        assert_eq!(HEADERS[SortColumn::ReleaseDate.index()], "Release Date");
    }

    #[test]
    fn download_args_parse() {
        let cli = Cli::parse_from([
            "connect-downloader",
            "download",
            "--input",
            "ids.json",
            "--format",
            "mp3-v0",
            "--policy",
            "halt",
        ]);
        match cli.command {
            Some(Command::Download { format, policy, .. }) => {
                assert_eq!(format, Some(DownloadFormat::Mp3V0));
                assert_eq!(policy, Some(FailurePolicy::Halt));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn tracks_sort_by_name() {
        let cli = Cli::parse_from(["connect-downloader", "tracks", "--sort", "release-date", "--desc"]);
        assert!(matches!(
            cli.command,
            Some(Command::Tracks {
                sort: Some(SortColumn::ReleaseDate),
                desc: true
            })
        ));
    }
}
