//! Renderer trait implemented by every format crate.

use crate::artifact::PdfArtifact;
use crate::error::Result;
use crate::options::ConversionOptions;
use crate::source::{SourceFile, SourceFormat};

/// Format renderer: turns one decoded source file into a finished PDF.
pub trait Renderer: Send + Sync {
    /// Human-readable name of this renderer.
    fn name(&self) -> &str;

    /// Source formats this renderer handles.
    fn formats(&self) -> &[SourceFormat];

    /// Render the whole source. Pages are appended in source order and the
    /// artifact is only returned once it is complete.
    fn render(&self, source: &SourceFile, options: &ConversionOptions) -> Result<PdfArtifact>;
}
