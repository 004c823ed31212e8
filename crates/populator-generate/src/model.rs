use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::sanitize::SanitizeMode;

/// Sub-directories holding more files than this get year buckets at depth 3.
pub const DEFAULT_YEAR_THRESHOLD: usize = 5;

/// Options for the generation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Maximum number of files rendered at the same time.
    pub concurrency: usize,
    /// Run seed. A fresh one is drawn per run when absent.
    pub seed: Option<u64>,
    /// Whether file and directory names get Windows-safe rewriting.
    pub sanitize: SanitizeMode,
    /// Back-date mtime/atime of generated files.
    pub realistic_timestamps: bool,
    /// "Today" for year buckets, generated dates and timestamps.
    pub reference_date: NaiveDate,
    /// Minimum sub-directory size (exclusive) for year buckets.
    pub year_threshold: usize,
}

impl GenerateOptions {
    pub fn current_year(&self) -> i32 {
        self.reference_date.year()
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            concurrency: 10,
            seed: None,
            sanitize: SanitizeMode::Auto,
            realistic_timestamps: true,
            reference_date: Local::now().date_naive(),
            year_threshold: DEFAULT_YEAR_THRESHOLD,
        }
    }
}

/// One file that could not be generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Every failure, sorted by path.
    pub failures: Vec<FileFailure>,
    pub directories_created: usize,
    pub seed: u64,
    pub bytes_written: u64,
    pub duration_ms: u64,
}

impl RunResult {
    pub fn new(total: usize, seed: u64) -> Self {
        Self {
            total,
            successful: 0,
            failed: 0,
            failures: Vec::new(),
            directories_created: 0,
            seed,
            bytes_written: 0,
            duration_ms: 0,
        }
    }

    pub fn record_success(&mut self, bytes: u64) {
        self.successful += 1;
        self.bytes_written = self.bytes_written.saturating_add(bytes);
    }

    pub fn record_failure(&mut self, path: PathBuf, reason: String) {
        self.failed += 1;
        self.failures.push(FileFailure { path, reason });
    }

    pub fn is_consistent(&self) -> bool {
        self.successful + self.failed == self.total
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}
