use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::MAX_TOTAL_FILES;
use crate::error::{Error, Result};
use crate::placement::Depth;

/// Validated run parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub total_files: usize,
    pub depth: Depth,
    pub concurrency: usize,
}

/// Check raw run parameters before anything is created on disk.
pub fn validate_run_config(total_files: usize, depth: u8, concurrency: usize) -> Result<RunConfig> {
    if total_files < 1 {
        return Err(Error::InvalidConfig(
            "count must be at least 1".to_string(),
        ));
    }
    if total_files > MAX_TOTAL_FILES {
        return Err(Error::InvalidConfig(format!(
            "count cannot exceed {MAX_TOTAL_FILES}"
        )));
    }
    if concurrency < 1 {
        return Err(Error::InvalidConfig(
            "concurrency must be at least 1".to_string(),
        ));
    }
    let depth = Depth::try_from(depth)?;

    Ok(RunConfig {
        total_files,
        depth,
        concurrency,
    })
}

/// Reject a base path that already exists as something other than a directory.
pub fn validate_base_path(path: &Path) -> Result<()> {
    if path.exists() && !path.is_dir() {
        return Err(Error::InvalidConfig(format!(
            "{} exists and is not a directory",
            path.display()
        )));
    }
    Ok(())
}
