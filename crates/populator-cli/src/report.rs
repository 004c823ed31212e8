use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use populator_core::PlacementSpec;
use populator_generate::sanitize::{SanitizeMode, max_file_name_length};
use populator_generate::{Preview, RunResult};

use crate::CliError;

/// Failures listed in the summary before the rest are collapsed.
pub const MAX_LISTED_FAILURES: usize = 10;

/// Planned tree followed by file counts per extension and per category.
pub fn format_preview(preview: &Preview) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Directory structure:");
    let _ = writeln!(out, "{}", preview.tree);
    let _ = writeln!(out);

    let _ = writeln!(out, "Files by extension:");
    let by_kind = count_by(&preview.specs, |spec| spec.output_kind.extension().to_string());
    for (kind, count) in by_kind {
        let _ = writeln!(out, "  {kind}: {count}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Files by category:");
    let by_category = count_by(&preview.specs, |spec| spec.category.as_str().to_string());
    for (category, count) in by_category {
        let _ = writeln!(out, "  {category}: {count}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "Seed: {}", preview.seed);
    out
}

/// Counts sorted by count descending, then by key.
fn count_by<F>(specs: &[PlacementSpec], key: F) -> Vec<(String, usize)>
where
    F: Fn(&PlacementSpec) -> String,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for spec in specs {
        *counts.entry(key(spec)).or_default() += 1;
    }
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    counts
}

pub fn format_summary(result: &RunResult) -> String {
    let elapsed = result.duration_ms as f64 / 1000.0;
    let rate = if elapsed > 0.0 {
        result.successful as f64 / elapsed
    } else {
        result.successful as f64
    };

    let mut out = String::new();
    let _ = writeln!(out, "Generation complete!");
    let _ = writeln!(out, "  Total files: {}", result.total);
    let _ = writeln!(out, "  Successful: {}", result.successful);
    let _ = writeln!(out, "  Failed: {}", result.failed);
    let _ = writeln!(out, "  Directories created: {}", result.directories_created);
    let _ = writeln!(out, "  Bytes written: {}", result.bytes_written);
    let _ = writeln!(out, "  Time elapsed: {elapsed:.2}s");
    let _ = writeln!(out, "  Rate: {rate:.1} files/sec");
    let _ = writeln!(out, "  Seed: {}", result.seed);

    if !result.failures.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Errors:");
        for failure in result.failures.iter().take(MAX_LISTED_FAILURES) {
            let _ = writeln!(out, "  {}: {}", failure.path.display(), failure.reason);
        }
        if result.failures.len() > MAX_LISTED_FAILURES {
            let _ = writeln!(
                out,
                "  ... and {} more errors",
                result.failures.len() - MAX_LISTED_FAILURES
            );
        }
    }
    out
}

pub fn format_platform_info() -> String {
    let sanitize = if SanitizeMode::Auto.is_active() {
        "enabled"
    } else {
        "disabled (use --windows to force)"
    };

    let mut out = String::new();
    let _ = writeln!(out, "Platform Information:");
    let _ = writeln!(out, "  OS family: {}", std::env::consts::FAMILY);
    let _ = writeln!(out, "  OS: {}", std::env::consts::OS);
    let _ = writeln!(out, "  Max filename length: {}", max_file_name_length());
    let _ = writeln!(out);
    let _ = writeln!(out, "Filename sanitization: {sanitize}");
    out
}

/// JSON document written by `--report`.
#[derive(Debug, Serialize)]
pub struct RunReport<'a> {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub base_path: PathBuf,
    pub depth: u8,
    #[serde(flatten)]
    pub result: &'a RunResult,
}

impl<'a> RunReport<'a> {
    pub fn new(run_id: Uuid, base_path: &Path, depth: u8, result: &'a RunResult) -> Self {
        Self {
            run_id,
            generated_at: Utc::now(),
            base_path: base_path.to_path_buf(),
            depth,
            result,
        }
    }
}

pub fn write_report(path: &Path, report: &RunReport<'_>) -> Result<(), CliError> {
    let mut data = serde_json::to_vec_pretty(report)?;
    data.push(b'\n');
    write_bytes_atomic(path, &data)
}

/// Write to a sibling temp file, then rename over `path`.
fn write_bytes_atomic(path: &Path, data: &[u8]) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| CliError::InvalidConfig(format!("invalid report path {}", path.display())))?;
    let tmp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(&tmp_path)?;
    file.write_all(data)?;
    file.sync_all()?;

    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use populator_core::{Category, ContentKind, OutputKind};

    fn spec(path: &str, output_kind: OutputKind, category: Category) -> PlacementSpec {
        PlacementSpec {
            target_path: PathBuf::from(path),
            output_kind,
            content_kind: ContentKind::Memo,
            category,
        }
    }

    fn failed_result(failures: usize) -> RunResult {
        let mut result = RunResult::new(20, 5);
        for index in 0..failures {
            result.record_failure(PathBuf::from(format!("/out/f{index:02}.txt")), "boom".into());
        }
        for _ in failures..20 {
            result.record_success(10);
        }
        result.duration_ms = 2_000;
        result
    }

    #[test]
    fn preview_counts_are_sorted_descending() {
        let preview = Preview {
            specs: vec![
                spec("/out/Sales/a.pdf", OutputKind::Pdf, Category::Sales),
                spec("/out/Sales/b.pdf", OutputKind::Pdf, Category::Sales),
                spec("/out/Legal/c.docx", OutputKind::Docx, Category::Legal),
            ],
            tree: "/out\n  Legal/\n  Sales/".to_string(),
            seed: 9,
        };
        let text = format_preview(&preview);
        assert!(text.starts_with("Directory structure:\n/out\n"));
        let pdf = text.find("  pdf: 2").expect("pdf count");
        let docx = text.find("  docx: 1").expect("docx count");
        assert!(pdf < docx);
        let sales = text.find("  Sales: 2").expect("sales count");
        let legal = text.find("  Legal: 1").expect("legal count");
        assert!(sales < legal);
        assert!(text.contains("Seed: 9"));
    }

    #[test]
    fn summary_lists_at_most_ten_failures() {
        let text = format_summary(&failed_result(13));
        assert!(text.contains("  Failed: 13"));
        assert!(text.contains("/out/f09.txt: boom"));
        assert!(!text.contains("/out/f10.txt"));
        assert!(text.contains("  ... and 3 more errors"));
        assert!(text.contains("  Rate: 3.5 files/sec"));
    }

    #[test]
    fn clean_summary_has_no_error_section() {
        let text = format_summary(&failed_result(0));
        assert!(!text.contains("Errors:"));
        assert!(text.contains("  Time elapsed: 2.00s"));
    }

    #[test]
    fn platform_info_reports_name_limit() {
        let text = format_platform_info();
        assert!(text.contains(&format!("Max filename length: {}", max_file_name_length())));
    }

    #[test]
    fn report_is_written_as_flat_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("reports").join("run.json");
        let result = failed_result(2);
        let report = RunReport::new(Uuid::new_v4(), Path::new("/out"), 2, &result);

        write_report(&path, &report).expect("write report");

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read report"))
                .expect("valid json");
        assert_eq!(value["total"], 20);
        assert_eq!(value["failed"], 2);
        assert_eq!(value["depth"], 2);
        assert_eq!(value["failures"].as_array().map(Vec::len), Some(2));
        assert!(!dir.path().join("reports").join("run.json.tmp").exists());
    }
}
