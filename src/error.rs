//! Error types for the dashboard library.
//!
//! Only whole-dataset failures surface here. Row-level defects (bad dates,
//! non-numeric costs, blank fields) are resolved to defaults by the loader
//! and never become errors.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A dataset file could not be opened or read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// CSV reading or writing failed (unreadable header, write error)
    #[error("failed to parse CSV {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Invalid configuration values
    #[error("configuration error: {0}")]
    Config(String),

    /// Config file is not valid TOML for `DashboardConfig`
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A loader thread panicked while reading its dataset
    #[error("dataset loader panicked: {0}")]
    LoaderPanicked(String),
}

pub type Result<T> = std::result::Result<T, Error>;
