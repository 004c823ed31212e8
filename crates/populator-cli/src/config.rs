use std::path::Path;

use serde::{Deserialize, Serialize};

use populator_generate::SanitizeMode;

use crate::CliError;

pub const DEFAULT_DEPTH: u8 = 2;
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Defaults read from `--config`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub depth: Option<u8>,
    pub concurrency: Option<usize>,
    pub seed: Option<u64>,
    pub windows: Option<bool>,
    pub timestamps: Option<bool>,
}

pub fn load_file_config(path: &Path) -> Result<FileConfig, CliError> {
    let content = std::fs::read_to_string(path).map_err(|err| {
        CliError::InvalidConfig(format!("cannot read {}: {err}", path.display()))
    })?;
    let config: FileConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub depth: Option<u8>,
    pub concurrency: Option<usize>,
    pub seed: Option<u64>,
    pub windows: bool,
    pub no_timestamps: bool,
}

/// Effective settings for one `generate` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub depth: u8,
    pub concurrency: usize,
    pub seed: Option<u64>,
    pub sanitize: SanitizeMode,
    pub timestamps: bool,
}

impl RunSettings {
    /// Command-line flags win over the file, the file wins over built-in defaults.
    pub fn merge(overrides: &Overrides, file: &FileConfig) -> Self {
        let windows = overrides.windows || file.windows.unwrap_or(false);
        let timestamps = !overrides.no_timestamps && file.timestamps.unwrap_or(true);

        Self {
            depth: overrides.depth.or(file.depth).unwrap_or(DEFAULT_DEPTH),
            concurrency: overrides
                .concurrency
                .or(file.concurrency)
                .unwrap_or(DEFAULT_CONCURRENCY),
            seed: overrides.seed.or(file.seed),
            sanitize: if windows {
                SanitizeMode::Always
            } else {
                SanitizeMode::Auto
            },
            timestamps,
        }
    }
}
