//! Placement planning: turns a file count and depth into concrete target paths.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rand::RngCore;
use tracing::debug;

use populator_core::{
    Category, Depth, Error as CoreError, PlacementSpec, allocate, allocate_subdirs,
    allocate_years,
};

use crate::errors::GenerationError;
use crate::model::GenerateOptions;
use crate::naming::Namer;
use crate::sanitize::{SanitizeMode, name_length_limit, sanitize_dir_name, truncate_chars};

/// Builds the ordered list of placement specs for a run.
#[derive(Clone)]
pub struct StructureBuilder {
    namer: Arc<dyn Namer>,
    sanitize: SanitizeMode,
    current_year: i32,
    year_threshold: usize,
}

impl StructureBuilder {
    pub fn new(namer: Arc<dyn Namer>, options: &GenerateOptions) -> Self {
        Self {
            namer,
            sanitize: options.sanitize,
            current_year: options.current_year(),
            year_threshold: options.year_threshold,
        }
    }

    /// Allocate `total` files under `base` and name each one.
    ///
    /// Categories come first, then sub-directories (depth 2+), then year
    /// buckets for sub-directories holding more than the year threshold
    /// (depth 3). Every returned path is unique.
    pub fn build(
        &self,
        base: &Path,
        total: usize,
        depth: Depth,
        rng: &mut dyn RngCore,
    ) -> Result<Vec<PlacementSpec>, GenerationError> {
        let mut planner = Planner {
            namer: self.namer.as_ref(),
            specs: Vec::with_capacity(total),
            taken: HashSet::with_capacity(total),
            max_name_len: name_length_limit(self.sanitize),
        };

        for (category, count) in allocate(total, &Category::weighted()) {
            let category_dir = base.join(sanitize_dir_name(category.as_str(), self.sanitize));
            let subdirs = category.subdirectories();

            if depth < Depth::Nested || subdirs.is_empty() {
                planner.emit(&category_dir, category, count, rng);
                continue;
            }

            for (subdir, sub_count) in allocate_subdirs(count, subdirs, rng) {
                let subdir_path = category_dir.join(sanitize_dir_name(subdir, self.sanitize));

                if depth == Depth::Dated && sub_count > self.year_threshold {
                    for (year, year_count) in allocate_years(sub_count, self.current_year) {
                        let year_dir = subdir_path.join(year.to_string());
                        planner.emit(&year_dir, category, year_count, rng);
                    }
                } else {
                    planner.emit(&subdir_path, category, sub_count, rng);
                }
            }
        }

        let specs = planner.specs;
        if specs.len() != total {
            return Err(CoreError::AllocationInvariant {
                expected: total,
                actual: specs.len(),
            }
            .into());
        }

        debug!(total, depth = %depth, "placement specs built");
        Ok(specs)
    }
}

struct Planner<'a> {
    namer: &'a dyn Namer,
    specs: Vec<PlacementSpec>,
    taken: HashSet<PathBuf>,
    /// Collision suffixes shorten the stem to stay within this many characters.
    max_name_len: usize,
}

impl Planner<'_> {
    fn emit(&mut self, dir: &Path, category: Category, count: usize, rng: &mut dyn RngCore) {
        for _ in 0..count {
            let choice = self.namer.name_for(category, rng);
            let target_path = self.unique_path(dir, &choice.file_name);
            self.specs.push(PlacementSpec {
                target_path,
                output_kind: choice.output_kind,
                content_kind: choice.content_kind,
                category,
            });
        }
    }

    fn unique_path(&mut self, dir: &Path, file_name: &str) -> PathBuf {
        let candidate = dir.join(file_name);
        if self.taken.insert(candidate.clone()) {
            return candidate;
        }

        let (stem, ext) = match file_name.rsplit_once('.') {
            Some((stem, ext)) => (stem, format!(".{ext}")),
            None => (file_name, String::new()),
        };
        let mut suffix = 2usize;
        loop {
            let tail = format!("_{suffix}{ext}");
            let mut name = stem.to_string();
            truncate_chars(&mut name, self.max_name_len.saturating_sub(tail.chars().count()));
            name.push_str(&tail);

            let candidate = dir.join(name);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

/// Render the directories implied by `specs` as an indented tree.
///
/// The first line is `base`; every directory below it follows in sorted order,
/// indented two spaces per level and suffixed with `/`.
pub fn render_tree(base: &Path, specs: &[PlacementSpec]) -> String {
    let mut directories = BTreeSet::new();
    for spec in specs {
        let mut current = spec.target_path.parent();
        while let Some(dir) = current {
            if dir == base || !dir.starts_with(base) {
                break;
            }
            directories.insert(dir.to_path_buf());
            current = dir.parent();
        }
    }

    let mut lines = vec![base.display().to_string()];
    for dir in &directories {
        let Ok(relative) = dir.strip_prefix(base) else {
            continue;
        };
        let level = relative.components().count();
        let name = relative
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        lines.push(format!("{}{}/", "  ".repeat(level), name));
    }
    lines.join("\n")
}

/// Distinct parent directories of `specs`, sorted.
pub fn target_directories(specs: &[PlacementSpec]) -> BTreeSet<PathBuf> {
    specs
        .iter()
        .filter_map(|spec| spec.target_path.parent())
        .map(Path::to_path_buf)
        .collect()
}
