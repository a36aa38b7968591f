//! Word document renderer.
//!
//! A DOCX is a ZIP archive of Office Open XML. The renderer:
//! - reads `word/styles.xml` and `word/numbering.xml` to classify paragraphs
//! - converts `word/document.xml` into semantic HTML through a [`StyleMap`]
//! - takes the PDF title from `docProps/core.xml`, falling back to the file name
//! - lays the HTML out with the document stylesheet and rasterizes it to pages

mod document;
mod metadata;
mod styles;

use std::sync::Arc;

use convert_core::artifact::PdfArtifact;
use convert_core::error::{ConvertError, Result};
use convert_core::options::ConversionOptions;
use convert_core::plugin::Renderer;
use convert_core::source::{SourceFile, SourceFormat};
use convert_raster::{parse_html, render_markup, RasterBackend, Stylesheet, SurfaceHost};
use convert_utils::archive::ZipReader;

pub use metadata::{parse_core_properties, CoreProperties};
pub use styles::{SemanticTag, StyleMap, StyleRule, StyleTarget};

/// HTML extracted from a Word container.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    pub properties: CoreProperties,
    pub html: String,
}

/// Pull semantic HTML out of DOCX bytes.
///
/// Anything that is not a ZIP archive with a `word/document.xml` part is a
/// decode error; the optional parts are skipped when missing.
pub fn extract_html(bytes: &[u8], map: &StyleMap) -> Result<ExtractedDocument> {
    let mut zip = ZipReader::open(bytes)
        .map_err(|e| ConvertError::Decode(format!("Not a Word document archive: {}", e)))?;

    let document = zip
        .read_string("word/document.xml")
        .map_err(|e| ConvertError::Decode(format!("Missing word/document.xml: {}", e)))?;

    let styles = zip
        .read_string("word/styles.xml")
        .map(|xml| styles::parse_styles(&xml))
        .unwrap_or_default();
    let numbering = zip
        .read_string("word/numbering.xml")
        .map(|xml| styles::parse_numbering(&xml))
        .unwrap_or_default();
    let properties = zip
        .read_string("docProps/core.xml")
        .map(|xml| parse_core_properties(&xml))
        .unwrap_or_default();

    let html = document::convert_document(&document, map, &styles, &numbering);
    log::debug!(
        "Extracted {} bytes of HTML using {} styles",
        html.len(),
        styles.len()
    );
    Ok(ExtractedDocument { properties, html })
}

pub struct DocxRenderer {
    host: SurfaceHost,
    backend: Arc<dyn RasterBackend>,
    style_map: StyleMap,
}

impl DocxRenderer {
    pub fn new(host: SurfaceHost, backend: Arc<dyn RasterBackend>) -> Self {
        Self {
            host,
            backend,
            style_map: StyleMap::default(),
        }
    }

    pub fn with_style_map(mut self, style_map: StyleMap) -> Self {
        self.style_map = style_map;
        self
    }

    pub fn style_map(&self) -> &StyleMap {
        &self.style_map
    }
}

impl Renderer for DocxRenderer {
    fn name(&self) -> &str {
        "Word Document"
    }

    fn formats(&self) -> &[SourceFormat] {
        &[SourceFormat::WordDocument]
    }

    fn render(&self, source: &SourceFile, options: &ConversionOptions) -> Result<PdfArtifact> {
        log::info!("Rendering Word document: {}", source.name());
        let extracted = extract_html(source.bytes(), &self.style_map)?;
        let title = extracted
            .properties
            .title
            .unwrap_or_else(|| source.stem().to_string());

        let blocks = parse_html(&extracted.html);
        let artifact = render_markup(
            &blocks,
            &Stylesheet::document(),
            &title,
            options,
            self.backend.as_ref(),
            &self.host,
        )?;
        log::info!(
            "Rendered \"{}\" to {} page(s)",
            title,
            artifact.page_count().unwrap_or(0)
        );
        Ok(artifact)
    }
}
