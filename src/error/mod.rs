//! Error types for every layer of the crate.
//!
//! Each concern owns a `thiserror` enum; `AppError` is the top-level error
//! returned from `main`.

mod app;
mod connect;
mod download;

pub use app::{AppError, SettingsError};
pub use connect::ConnectError;
pub use download::DownloadError;
