use serde::{Deserialize, Serialize};
use std::fmt;

pub const SIGNIN_PATH: &str = "/signin";
pub const SESSION_PATH: &str = "/session";
pub const TRACKS_PATH: &str = "/tracks";
pub const ALBUM_PATH: &str = "/album";

pub const MAX_REDIRECTS: usize = 10;

pub const USER_AGENT: &str = concat!("connect-downloader/", env!("CARGO_PKG_VERSION"));

/// Audio encodings offered by the album download endpoint.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
pub enum DownloadFormat {
    #[value(name = "wav")]
    #[serde(rename = "wav")]
    Wav,
    #[default]
    #[value(name = "mp3-320")]
    #[serde(rename = "mp3-320")]
    Mp3Cbr320,
    #[value(name = "mp3-v0")]
    #[serde(rename = "mp3-v0")]
    Mp3V0,
    #[value(name = "mp3-v2")]
    #[serde(rename = "mp3-v2")]
    Mp3V2,
    #[value(name = "mp3-128")]
    #[serde(rename = "mp3-128")]
    Mp3Cbr128,
    #[value(name = "flac")]
    #[serde(rename = "flac")]
    Flac,
}

impl DownloadFormat {
    /// Query string appended to `/album/{id}/download`.
    pub const fn query(self) -> &'static str {
        match self {
            DownloadFormat::Wav => "?format=wav",
            DownloadFormat::Mp3Cbr320 => "?format=mp3&bitRate=320",
            DownloadFormat::Mp3V0 => "?format=mp3&quality=0",
            DownloadFormat::Mp3V2 => "?format=mp3&quality=2",
            DownloadFormat::Mp3Cbr128 => "?format=mp3&bitRate=128",
            DownloadFormat::Flac => "?format=flac",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DownloadFormat::Wav => "WAV",
            DownloadFormat::Mp3Cbr320 => "MP3 320",
            DownloadFormat::Mp3V0 => "MP3 V0",
            DownloadFormat::Mp3V2 => "MP3 V2",
            DownloadFormat::Mp3Cbr128 => "MP3 128",
            DownloadFormat::Flac => "FLAC",
        }
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
