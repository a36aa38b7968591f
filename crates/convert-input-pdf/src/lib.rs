//! PDF input: already a PDF, so the bytes go out exactly as they came in.
//!
//! The document is parsed only to report a page count. A file lopdf cannot
//! read is still passed through; it just has no known page count.

use lopdf::Document;

use convert_core::artifact::PdfArtifact;
use convert_core::error::Result;
use convert_core::options::ConversionOptions;
use convert_core::plugin::Renderer;
use convert_core::source::{SourceFile, SourceFormat};

#[derive(Debug, Default)]
pub struct PdfRenderer;

impl PdfRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for PdfRenderer {
    fn name(&self) -> &str {
        "PDF"
    }

    fn formats(&self) -> &[SourceFormat] {
        &[SourceFormat::Pdf]
    }

    fn render(&self, source: &SourceFile, _options: &ConversionOptions) -> Result<PdfArtifact> {
        let pages = count_pages(source.bytes());
        match pages {
            Some(n) => log::info!("Passing through PDF {} ({} pages)", source.name(), n),
            None => log::info!("Passing through PDF {}", source.name()),
        }
        Ok(PdfArtifact::passthrough(source.bytes().to_vec(), pages))
    }
}

/// Number of pages in `bytes`, if lopdf can parse it.
pub fn count_pages(bytes: &[u8]) -> Option<usize> {
    match Document::load_mem(bytes) {
        Ok(doc) => Some(doc.get_pages().len()),
        Err(e) => {
            log::warn!("Could not read page tree: {}", e);
            None
        }
    }
}
