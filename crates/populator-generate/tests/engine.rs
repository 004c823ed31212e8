use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rand_chacha::ChaCha8Rng;

use populator_core::{ContentKind, Depth};
use populator_generate::{
    GenerateOptions, GenerationError, Orchestrator, ProgressCallback, RenderError, Renderer,
    RendererRegistry, SanitizeMode,
};

fn options(seed: u64, concurrency: usize) -> GenerateOptions {
    GenerateOptions {
        concurrency,
        seed: Some(seed),
        sanitize: SanitizeMode::Never,
        realistic_timestamps: false,
        reference_date: NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date"),
        year_threshold: 5,
    }
}

fn files_under(root: &Path) -> BTreeSet<PathBuf> {
    let mut files = BTreeSet::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in std::fs::read_dir(&dir).expect("read dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                stack.push(path);
            } else {
                files.insert(path);
            }
        }
    }
    files
}

/// Tracks how many renders are in flight at once.
#[derive(Default)]
struct GaugeRenderer {
    active: AtomicUsize,
    peak: AtomicUsize,
}

#[async_trait]
impl Renderer for GaugeRenderer {
    fn name(&self) -> &'static str {
        "gauge"
    }

    async fn render(
        &self,
        _path: &Path,
        _content: ContentKind,
        _rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(2)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(0)
    }
}

struct FailingRenderer;

#[async_trait]
impl Renderer for FailingRenderer {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn render(
        &self,
        _path: &Path,
        _content: ContentKind,
        _rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        Err(RenderError::Encode("renderer unavailable".to_string()))
    }
}

/// Writes a small file unless the path is on the deny list.
struct SelectiveRenderer {
    fail_on: HashSet<PathBuf>,
}

#[async_trait]
impl Renderer for SelectiveRenderer {
    fn name(&self) -> &'static str {
        "selective"
    }

    async fn render(
        &self,
        path: &Path,
        _content: ContentKind,
        _rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        if self.fail_on.contains(path) {
            return Err(RenderError::Encode(format!("refusing {}", path.display())));
        }
        tokio::fs::write(path, b"ok").await?;
        Ok(2)
    }
}

struct PanickingRenderer;

#[async_trait]
impl Renderer for PanickingRenderer {
    fn name(&self) -> &'static str {
        "panicking"
    }

    async fn render(
        &self,
        _path: &Path,
        _content: ContentKind,
        _rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError> {
        panic!("renderer bug");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrency_never_exceeds_limit() {
    for limit in [1, 5, 50] {
        let dir = tempfile::tempdir().expect("tempdir");
        let gauge = Arc::new(GaugeRenderer::default());
        let orchestrator = Orchestrator::new(options(7, limit))
            .with_registry(RendererRegistry::new(gauge.clone()));

        let result = orchestrator
            .run(dir.path(), 200, Depth::Nested, None)
            .await
            .expect("run");

        assert_eq!(result.total, 200);
        assert_eq!(result.successful, 200);
        let peak = gauge.peak.load(Ordering::SeqCst);
        assert!(peak >= 1 && peak <= limit, "limit={limit} peak={peak}");
    }
}

#[tokio::test]
async fn every_failure_is_counted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = Orchestrator::new(options(3, 8))
        .with_registry(RendererRegistry::new(Arc::new(FailingRenderer)));

    let result = orchestrator
        .run(dir.path(), 60, Depth::Dated, None)
        .await
        .expect("run");

    assert_eq!(result.failed, result.total);
    assert_eq!(result.successful, 0);
    assert_eq!(result.failures.len(), 60);
    assert!(result.is_consistent());
    assert!(
        result
            .failures
            .iter()
            .all(|failure| failure.reason.contains("renderer unavailable"))
    );
}

#[tokio::test]
async fn failing_paths_are_isolated_and_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let opts = options(1234, 3);

    let preview = Orchestrator::new(opts.clone())
        .preview(dir.path(), 10, Depth::Flat)
        .expect("preview");
    assert_eq!(preview.specs.len(), 10);
    let doomed: Vec<PathBuf> = [2, 7]
        .iter()
        .map(|index| preview.specs[*index].target_path.clone())
        .collect();

    let renderer = SelectiveRenderer {
        fail_on: doomed.iter().cloned().collect(),
    };
    let orchestrator =
        Orchestrator::new(opts).with_registry(RendererRegistry::new(Arc::new(renderer)));
    let result = orchestrator
        .run(dir.path(), 10, Depth::Flat, None)
        .await
        .expect("run");

    assert_eq!(result.total, 10);
    assert_eq!(result.failed, 2);
    assert_eq!(result.successful, 8);

    let mut expected = doomed.clone();
    expected.sort();
    let reported: Vec<PathBuf> = result
        .failures
        .iter()
        .map(|failure| failure.path.clone())
        .collect();
    assert_eq!(reported, expected);
    for path in &doomed {
        assert!(!path.exists());
    }
}

#[tokio::test]
async fn panicking_renderer_is_recorded_as_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = Orchestrator::new(options(5, 4))
        .with_registry(RendererRegistry::new(Arc::new(PanickingRenderer)));

    let result = orchestrator
        .run(dir.path(), 12, Depth::Flat, None)
        .await
        .expect("run");

    assert_eq!(result.failed, 12);
    assert!(result.failures[0].reason.contains("renderer bug"));
}

#[tokio::test]
async fn progress_is_monotonic_and_ends_at_total() {
    let dir = tempfile::tempdir().expect("tempdir");
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let progress: ProgressCallback = Arc::new(move |completed: usize, total: usize| {
        sink.lock().expect("progress lock").push((completed, total));
    });

    let orchestrator = Orchestrator::new(options(11, 6))
        .with_registry(RendererRegistry::new(Arc::new(GaugeRenderer::default())));
    let result = orchestrator
        .run(dir.path(), 75, Depth::Nested, Some(progress))
        .await
        .expect("run");

    let calls = calls.lock().expect("progress lock");
    assert_eq!(calls.len(), result.total);
    assert!(calls.windows(2).all(|pair| pair[0].0 < pair[1].0));
    assert!(calls.iter().all(|(_, total)| *total == 75));
    assert_eq!(calls.last().copied(), Some((75, 75)));
}

#[tokio::test]
async fn preview_matches_files_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = Orchestrator::new(options(99, 10));

    let preview = orchestrator
        .preview(dir.path(), 120, Depth::Dated)
        .expect("preview");
    let result = orchestrator
        .run(dir.path(), 120, Depth::Dated, None)
        .await
        .expect("run");

    assert_eq!(result.seed, preview.seed);
    assert_eq!(result.successful, 120, "failures: {:?}", result.failures);

    let planned: BTreeSet<PathBuf> = preview
        .specs
        .iter()
        .map(|spec| spec.target_path.clone())
        .collect();
    assert_eq!(files_under(dir.path()), planned);
    assert!(preview.tree.starts_with(&dir.path().display().to_string()));
}

#[tokio::test]
async fn same_seed_produces_identical_trees() {
    let first = tempfile::tempdir().expect("tempdir");
    let second = tempfile::tempdir().expect("tempdir");

    for dir in [&first, &second] {
        Orchestrator::new(options(2024, 16))
            .run(dir.path(), 80, Depth::Nested, None)
            .await
            .expect("run");
    }

    // docx, xlsx and pdf writers stamp creation metadata, so only their paths are compared.
    let relative = |root: &Path| -> Vec<(PathBuf, Option<Vec<u8>>)> {
        files_under(root)
            .into_iter()
            .map(|path| {
                let stamped = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| matches!(ext, "docx" | "xlsx" | "pdf"));
                let bytes = (!stamped).then(|| std::fs::read(&path).expect("read"));
                (path.strip_prefix(root).expect("prefix").to_path_buf(), bytes)
            })
            .collect()
    };
    let first = relative(first.path());
    assert_eq!(first, relative(second.path()));
    assert!(first.iter().any(|(_, bytes)| bytes.is_some()));
}

#[tokio::test]
async fn base_path_that_is_a_file_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("occupied");
    std::fs::write(&file, b"x").expect("write");

    let err = Orchestrator::new(options(1, 2))
        .run(&file, 10, Depth::Flat, None)
        .await
        .expect_err("file base must fail");
    assert!(matches!(
        err,
        GenerationError::Core(populator_core::Error::InvalidConfig(_))
    ));
}

#[tokio::test]
async fn base_below_a_file_reports_the_base_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let file = dir.path().join("occupied");
    std::fs::write(&file, b"x").expect("write");
    let base = file.join("share");

    let err = Orchestrator::new(options(1, 2))
        .run(&base, 10, Depth::Flat, None)
        .await
        .expect_err("base below a file must fail");
    match err {
        GenerationError::BaseDirectory { path, .. } => assert_eq!(path, base),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn invalid_counts_fail_before_any_io() {
    let dir = tempfile::tempdir().expect("tempdir");
    let base = dir.path().join("never-created");

    let err = Orchestrator::new(options(1, 2))
        .run(&base, 0, Depth::Flat, None)
        .await
        .expect_err("zero files must fail");
    assert!(matches!(err, GenerationError::Core(_)));
    assert!(!base.exists());
}

#[tokio::test]
async fn directory_count_matches_distinct_parents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let orchestrator = Orchestrator::new(options(8, 4))
        .with_registry(RendererRegistry::new(Arc::new(GaugeRenderer::default())));

    let preview = orchestrator
        .preview(dir.path(), 50, Depth::Nested)
        .expect("preview");
    let parents: HashSet<&Path> = preview
        .specs
        .iter()
        .filter_map(|spec| spec.target_path.parent())
        .collect();

    let result = orchestrator
        .run(dir.path(), 50, Depth::Nested, None)
        .await
        .expect("run");
    assert_eq!(result.directories_created, parents.len());
    assert!(parents.iter().all(|parent| parent.is_dir()));
}
