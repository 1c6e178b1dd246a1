pub mod actor;
mod client;
pub mod models;

pub use actor::{TrackListEvent, spawn_track_loader};
pub use client::{
    ConnectConfig, CookieStore, DEFAULT_BASE_URL, DownloadFormat, Session, StoredCookie,
    default_data_dir, load_cookies, save_cookies,
};
