use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use chrono::{NaiveDate, NaiveDateTime};
use futures::stream::{FuturesUnordered, StreamExt};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use populator_core::{Depth, PlacementSpec, validate_base_path, validate_run_config};

use crate::errors::GenerationError;
use crate::model::{GenerateOptions, RunResult};
use crate::naming::{BusinessNamer, Namer};
use crate::renderers::{Renderer, RendererRegistry};
use crate::structure::{StructureBuilder, render_tree, target_directories};
use crate::timestamps::{apply_file_times, plan_file_times, timestamp_ceiling};

/// Called once per finished file with `(completed, total)`.
pub type ProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// Planned output of a run, computed without touching the filesystem.
#[derive(Debug, Clone)]
pub struct Preview {
    pub specs: Vec<PlacementSpec>,
    pub tree: String,
    pub seed: u64,
}

/// Entry point for populating a directory tree.
#[derive(Clone)]
pub struct Orchestrator {
    options: GenerateOptions,
    namer: Arc<dyn Namer>,
    registry: RendererRegistry,
}

impl Orchestrator {
    pub fn new(options: GenerateOptions) -> Self {
        let namer = Arc::new(BusinessNamer::new(options.reference_date, options.sanitize));
        let registry = RendererRegistry::with_defaults(options.reference_date);
        Self {
            options,
            namer,
            registry,
        }
    }

    pub fn with_namer(mut self, namer: Arc<dyn Namer>) -> Self {
        self.namer = namer;
        self
    }

    pub fn with_registry(mut self, registry: RendererRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Plan a run and render its directory tree. Nothing is written.
    pub fn preview(
        &self,
        base: &Path,
        total: usize,
        depth: Depth,
    ) -> Result<Preview, GenerationError> {
        validate_run_config(total, depth.level(), self.options.concurrency)?;
        let seed = self.resolve_seed();
        let specs = self.plan(base, total, depth, seed)?;
        let tree = render_tree(base, &specs);
        Ok(Preview { specs, tree, seed })
    }

    /// Create `total` files under `base`.
    ///
    /// Configuration problems and directory-creation failures abort the run.
    /// Individual file failures are recorded in the result and never stop
    /// other files.
    pub async fn run(
        &self,
        base: &Path,
        total: usize,
        depth: Depth,
        progress: Option<ProgressCallback>,
    ) -> Result<RunResult, GenerationError> {
        let start = Instant::now();
        let config = validate_run_config(total, depth.level(), self.options.concurrency)?;
        validate_base_path(base)?;

        tokio::fs::create_dir_all(base)
            .await
            .map_err(|source| GenerationError::BaseDirectory {
                path: base.to_path_buf(),
                source,
            })?;

        let seed = self.resolve_seed();
        info!(
            base = %base.display(),
            total,
            depth = %depth,
            concurrency = config.concurrency,
            seed,
            "generation started"
        );

        let specs = self.plan(base, total, depth, seed)?;

        let directories = target_directories(&specs);
        for dir in &directories {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|source| GenerationError::Directory {
                    path: dir.clone(),
                    source,
                })?;
        }
        info!(directories = directories.len(), "directories created");

        let mut result = RunResult::new(specs.len(), seed);
        result.directories_created = directories.len();

        let gate = Arc::new(Semaphore::new(
            config.concurrency.min(Semaphore::MAX_PERMITS),
        ));
        let render_seed = hash_seed(seed, "render");
        let stamping = self
            .options
            .realistic_timestamps
            .then(|| Stamping::new(self.options.reference_date));

        let mut pending = FuturesUnordered::new();
        for (index, spec) in specs.into_iter().enumerate() {
            let renderer = self.registry.resolve(spec.output_kind);
            let gate = Arc::clone(&gate);
            let path = spec.target_path.clone();
            let task_seed = hash_task_seed(render_seed, index as u64);

            let handle = tokio::spawn(async move {
                let _permit = gate.acquire_owned().await.map_err(|err| err.to_string())?;
                generate_file(renderer, spec, task_seed, stamping).await
            });
            pending.push(async move { (path, handle.await) });
        }

        let total = result.total;
        let mut completed = 0;
        while let Some((path, joined)) = pending.next().await {
            match joined {
                Ok(Ok(bytes)) => result.record_success(bytes),
                Ok(Err(reason)) => record_failure(&mut result, path, reason),
                Err(err) => record_failure(&mut result, path, join_failure(err)),
            }
            completed += 1;
            if let Some(progress) = &progress {
                progress(completed, total);
            }
        }

        result.failures.sort_by(|a, b| a.path.cmp(&b.path));
        result.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            total = result.total,
            successful = result.successful,
            failed = result.failed,
            directories = result.directories_created,
            bytes_written = result.bytes_written,
            duration_ms = result.duration_ms,
            "generation completed"
        );
        Ok(result)
    }

    fn resolve_seed(&self) -> u64 {
        self.options.seed.unwrap_or_else(|| rand::rng().random())
    }

    fn plan(
        &self,
        base: &Path,
        total: usize,
        depth: Depth,
        seed: u64,
    ) -> Result<Vec<PlacementSpec>, GenerationError> {
        let builder = StructureBuilder::new(Arc::clone(&self.namer), &self.options);
        let mut rng = ChaCha8Rng::seed_from_u64(hash_seed(seed, "structure"));
        builder.build(base, total, depth, &mut rng)
    }
}

#[derive(Debug, Clone, Copy)]
struct Stamping {
    reference_date: NaiveDate,
    ceiling: NaiveDateTime,
}

impl Stamping {
    fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            ceiling: timestamp_ceiling(reference_date),
        }
    }
}

async fn generate_file(
    renderer: Arc<dyn Renderer>,
    spec: PlacementSpec,
    seed: u64,
    stamping: Option<Stamping>,
) -> Result<u64, String> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let bytes = renderer
        .render(&spec.target_path, spec.content_kind, &mut rng)
        .await
        .map_err(|err| err.to_string())?;
    debug!(path = %spec.target_path.display(), renderer = renderer.name(), bytes, "file written");

    if let Some(stamping) = stamping {
        let times = plan_file_times(
            spec.file_name().unwrap_or_default(),
            stamping.reference_date,
            stamping.ceiling,
            &mut rng,
        );
        if let Err(err) = apply_file_times(spec.target_path.clone(), times).await {
            warn!(
                path = %spec.target_path.display(),
                error = %err,
                "could not set file timestamps"
            );
        }
    }

    Ok(bytes)
}

fn record_failure(result: &mut RunResult, path: PathBuf, reason: String) {
    warn!(path = %path.display(), error = %reason, "file generation failed");
    result.record_failure(path, reason);
}

fn join_failure(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        "generation task cancelled".to_string()
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("renderer panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("renderer panicked: {message}")
    } else {
        "renderer panicked".to_string()
    }
}

fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn hash_task_seed(render_seed: u64, index: u64) -> u64 {
    let hash = render_seed ^ index.wrapping_mul(0x9e3779b97f4a7c15);
    hash.wrapping_mul(0x100000001b3)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_seeds_differ_per_index() {
        let base = hash_seed(42, "render");
        let seeds: std::collections::HashSet<u64> =
            (0..1_000).map(|index| hash_task_seed(base, index)).collect();
        assert_eq!(seeds.len(), 1_000);
    }

    #[test]
    fn phase_seeds_are_independent() {
        assert_ne!(hash_seed(42, "structure"), hash_seed(42, "render"));
        assert_eq!(hash_seed(42, "structure"), hash_seed(42, "structure"));
    }

    #[test]
    fn panic_payloads_become_reasons() {
        let reason = panic_message(Box::new("disk on fire"));
        assert_eq!(reason, "renderer panicked: disk on fire");
        let reason = panic_message(Box::new(7_u8));
        assert_eq!(reason, "renderer panicked");
    }
}
