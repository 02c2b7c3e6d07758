//! Console error type.

use std::path::PathBuf;

use shipdeck_grid::error::BulkEditError;
use shipdeck_grid::error::EditError;
use shipdeck_lib::error::StoreError;

use crate::settings::SettingsError;

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid filter '{0}', expected COLUMN=VALUE")]
    InvalidFilter(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Edit(#[from] EditError),

    #[error(transparent)]
    Bulk(#[from] BulkEditError),

    #[error(transparent)]
    Settings(#[from] SettingsError),
}

impl ConsoleError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
