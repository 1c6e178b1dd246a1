//! Sign in to Monstercat Connect, list the track catalogue and download
//! albums.

pub mod connect;
pub mod domain;
pub mod download;
pub mod error;
pub mod logging;
pub mod settings;
pub mod ui;
