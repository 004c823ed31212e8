//! File-tree population engine.
//!
//! Turns "N files at depth D" into placement specs (`structure`), then
//! renders every spec concurrently under a bounded gate (`engine`) and
//! reports per-file failures without stopping the run.

pub mod content;
pub mod engine;
pub mod errors;
pub mod model;
pub mod naming;
pub mod renderers;
pub mod sanitize;
pub mod structure;
pub mod timestamps;

pub use engine::{Orchestrator, Preview, ProgressCallback};
pub use errors::GenerationError;
pub use model::{FileFailure, GenerateOptions, RunResult};
pub use naming::{BusinessNamer, NameChoice, Namer};
pub use renderers::{RenderError, Renderer, RendererRegistry};
pub use sanitize::SanitizeMode;
pub use structure::{StructureBuilder, render_tree};
