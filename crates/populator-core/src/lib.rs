//! Core contracts and allocation helpers for the populator.
//!
//! This crate defines the category catalogue, placement types, the weighted
//! allocator and run-configuration validation shared by the generator and the
//! CLI. Nothing here writes to the filesystem.

pub mod allocate;
pub mod catalog;
pub mod error;
pub mod placement;
pub mod validation;

pub use allocate::{
    AllocationPlan, YEAR_SPAN, YEAR_WEIGHTS, allocate, allocate_subdirs, allocate_years,
};
pub use catalog::{Category, ContentKind, OutputKind};
pub use error::{Error, Result};
pub use placement::{Depth, PlacementSpec};
pub use validation::{RunConfig, validate_base_path, validate_run_config};

/// Upper bound on files requested in a single run.
pub const MAX_TOTAL_FILES: usize = 10_000;
