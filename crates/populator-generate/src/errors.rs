use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a generation run.
///
/// Per-file rendering problems are not represented here; they are collected
/// into [`crate::RunResult::failures`] instead.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("cannot create base directory {}: {source}", path.display())]
    BaseDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot create directory {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Core(#[from] populator_core::Error),
}
