//! Rendering collaborators: one renderer per output kind plus a fallback.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;

use populator_core::{ContentKind, OutputKind};

use crate::content::ContentGenerator;

mod data;
mod markup;
mod office;
mod slides;
mod text;

pub use data::{CsvRenderer, JsonRenderer};
pub use markup::{HtmlRenderer, XmlRenderer};
pub use office::{DocxRenderer, PdfRenderer, XlsxRenderer};
pub use slides::PptxRenderer;
pub use text::{MarkdownRenderer, PlainTextRenderer};

/// Failure to produce one file. Recorded against the file, never fatal.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("encode error: {0}")]
    Encode(String),
}

/// Turns a content kind into a file on disk.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Short identifier used in logs (e.g. `csv`).
    fn name(&self) -> &'static str;

    /// Write the file at `path` and return the number of bytes written.
    async fn render(
        &self,
        path: &Path,
        content: ContentKind,
        rng: &mut ChaCha8Rng,
    ) -> Result<u64, RenderError>;
}

/// Renderers keyed by output kind, resolved once per run.
#[derive(Clone)]
pub struct RendererRegistry {
    renderers: HashMap<OutputKind, Arc<dyn Renderer>>,
    fallback: Arc<dyn Renderer>,
}

impl RendererRegistry {
    /// Empty registry; every kind resolves to `fallback`.
    pub fn new(fallback: Arc<dyn Renderer>) -> Self {
        Self {
            renderers: HashMap::new(),
            fallback,
        }
    }

    /// A renderer for every output kind.
    ///
    /// The memo fallback only serves kinds removed from a registry or never added to
    /// one built with [`RendererRegistry::new`].
    pub fn with_defaults(today: NaiveDate) -> Self {
        let content = ContentGenerator::new(today);
        Self::new(Arc::new(PlainTextRenderer::fallback(content)))
            .with(OutputKind::Txt, Arc::new(PlainTextRenderer::new(content)))
            .with(OutputKind::Md, Arc::new(MarkdownRenderer::new(content)))
            .with(OutputKind::Json, Arc::new(JsonRenderer::new(content)))
            .with(OutputKind::Csv, Arc::new(CsvRenderer::new(content)))
            .with(OutputKind::Xml, Arc::new(XmlRenderer::new(content)))
            .with(OutputKind::Html, Arc::new(HtmlRenderer::new(content)))
            .with(OutputKind::Docx, Arc::new(DocxRenderer::new(content)))
            .with(OutputKind::Xlsx, Arc::new(XlsxRenderer::new(content)))
            .with(OutputKind::Pdf, Arc::new(PdfRenderer::new(content)))
            .with(OutputKind::Pptx, Arc::new(PptxRenderer::new(content)))
    }

    pub fn with(mut self, kind: OutputKind, renderer: Arc<dyn Renderer>) -> Self {
        self.register(kind, renderer);
        self
    }

    /// Bind `renderer` to `kind`, returning the renderer it replaced.
    pub fn register(
        &mut self,
        kind: OutputKind,
        renderer: Arc<dyn Renderer>,
    ) -> Option<Arc<dyn Renderer>> {
        self.renderers.insert(kind, renderer)
    }

    pub fn resolve(&self, kind: OutputKind) -> Arc<dyn Renderer> {
        self.renderers
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.fallback))
    }

    pub fn is_registered(&self, kind: OutputKind) -> bool {
        self.renderers.contains_key(&kind)
    }

    pub fn registered_kinds(&self) -> Vec<OutputKind> {
        let mut kinds: Vec<OutputKind> = self.renderers.keys().copied().collect();
        kinds.sort();
        kinds
    }
}

impl fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("registered", &self.registered_kinds())
            .field("fallback", &self.fallback.name())
            .finish()
    }
}

async fn write_bytes(path: &Path, bytes: Vec<u8>) -> Result<u64, RenderError> {
    let len = bytes.len() as u64;
    tokio::fs::write(path, bytes).await?;
    Ok(len)
}

/// Run a CPU-bound document encoder on the blocking pool.
async fn encode_blocking<F>(encode: F) -> Result<Vec<u8>, RenderError>
where
    F: FnOnce() -> Result<Vec<u8>, RenderError> + Send + 'static,
{
    tokio::task::spawn_blocking(encode)
        .await
        .map_err(|err| RenderError::Encode(err.to_string()))?
}

/// Escape text for XML and HTML bodies and attribute values.
pub(crate) fn escape_markup(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 30).expect("valid date")
    }

    #[test]
    fn defaults_cover_every_output_kind() {
        let registry = RendererRegistry::with_defaults(today());
        assert_eq!(
            registry.registered_kinds(),
            vec![
                OutputKind::Docx,
                OutputKind::Xlsx,
                OutputKind::Pdf,
                OutputKind::Txt,
                OutputKind::Json,
                OutputKind::Csv,
                OutputKind::Pptx,
                OutputKind::Xml,
                OutputKind::Html,
                OutputKind::Md,
            ]
        );
        for (kind, name) in [
            (OutputKind::Docx, "docx"),
            (OutputKind::Xlsx, "xlsx"),
            (OutputKind::Pdf, "pdf"),
            (OutputKind::Pptx, "pptx"),
        ] {
            assert_eq!(registry.resolve(kind).name(), name);
        }
    }

    #[test]
    fn unregistered_kinds_resolve_to_fallback() {
        let content = ContentGenerator::new(today());
        let registry = RendererRegistry::new(Arc::new(PlainTextRenderer::fallback(content)))
            .with(OutputKind::Csv, Arc::new(CsvRenderer::new(content)));
        assert!(!registry.is_registered(OutputKind::Docx));
        assert_eq!(registry.resolve(OutputKind::Docx).name(), "fallback");
        assert_eq!(registry.resolve(OutputKind::Csv).name(), "csv");
    }

    #[test]
    fn register_replaces_existing_binding() {
        let content = ContentGenerator::new(today());
        let mut registry = RendererRegistry::with_defaults(today());
        let previous = registry.register(OutputKind::Csv, Arc::new(JsonRenderer::new(content)));
        assert_eq!(previous.map(|renderer| renderer.name()), Some("csv"));
        assert_eq!(registry.resolve(OutputKind::Csv).name(), "json");
    }

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_markup(r#"R&D <team> "q3" 'plan'"#),
            "R&amp;D &lt;team&gt; &quot;q3&quot; &apos;plan&apos;"
        );
    }
}
