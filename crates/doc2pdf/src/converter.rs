//! Conversion dispatcher: classifies a source file and hands it to the one
//! renderer for its format.

use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use convert_core::artifact::PdfArtifact;
use convert_core::error::{ConvertError, Result};
use convert_core::options::ConversionOptions;
use convert_core::plugin::Renderer;
use convert_core::source::{SourceFile, SourceFormat};
use convert_input_docx::DocxRenderer;
use convert_input_html::HtmlRenderer;
use convert_input_image::ImageRenderer;
use convert_input_pdf::PdfRenderer;
use convert_input_pptx::PresentationRenderer;
use convert_input_txt::TextRenderer;
use convert_input_xlsx::SpreadsheetRenderer;
use convert_raster::{GlyphRasterizer, RasterBackend, SurfaceHost};
use convert_utils::mime::mime_from_path;

/// Entry point of the pipeline. One converter can serve any number of
/// conversions; each call gets its own render surface.
pub struct Converter {
    options: ConversionOptions,
    host: SurfaceHost,
    backend: Arc<dyn RasterBackend>,
}

impl Converter {
    pub fn new(options: ConversionOptions) -> Self {
        Self::with_backend(options, Arc::new(GlyphRasterizer))
    }

    pub fn with_backend(options: ConversionOptions, backend: Arc<dyn RasterBackend>) -> Self {
        Self {
            options,
            host: SurfaceHost::new(),
            backend,
        }
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Host owning the off-screen surfaces of markup conversions.
    pub fn host(&self) -> &SurfaceHost {
        &self.host
    }

    pub fn renderer_for(&self, format: SourceFormat) -> Arc<dyn Renderer> {
        match format {
            SourceFormat::Image => Arc::new(ImageRenderer),
            SourceFormat::WordDocument => {
                Arc::new(DocxRenderer::new(self.host.clone(), self.backend.clone()))
            }
            SourceFormat::Spreadsheet => Arc::new(SpreadsheetRenderer),
            SourceFormat::Presentation => Arc::new(PresentationRenderer),
            SourceFormat::Text => Arc::new(TextRenderer),
            SourceFormat::Html => {
                Arc::new(HtmlRenderer::new(self.host.clone(), self.backend.clone()))
            }
            SourceFormat::Pdf => Arc::new(PdfRenderer::new()),
        }
    }

    /// Convert one file. The renderer runs on the blocking pool; when a
    /// render deadline is configured and passes first, the caller gets
    /// `Timeout` and never sees the unfinished document. The renderer is
    /// told the same deadline and is waited for, so no render surface is
    /// left attached once `Timeout` is returned.
    pub async fn convert(&self, source: SourceFile) -> Result<PdfArtifact> {
        let format = source.format()?;
        let renderer = self.renderer_for(format);
        log::info!(
            "Converting {} ({} bytes) with the {} renderer",
            source.name(),
            source.size(),
            renderer.name()
        );

        let mut options = self.options.clone();
        let limit = options.render_timeout();
        options.deadline = limit.map(|limit| Instant::now() + limit);
        let mut task = tokio::task::spawn_blocking(move || renderer.render(&source, &options));

        let joined = match limit {
            Some(limit) => match tokio::time::timeout(limit, &mut task).await {
                Ok(joined) => joined,
                Err(_) => {
                    log::warn!("Render deadline of {:?} passed, waiting for cleanup", limit);
                    if let Err(e) = task.await {
                        log::warn!("Renderer task failed after the deadline: {}", e);
                    }
                    return Err(ConvertError::Timeout(limit));
                }
            },
            None => task.await,
        };
        let artifact = joined
            .map_err(|e| ConvertError::Render(format!("Renderer task failed: {}", e)))??;

        match artifact.page_count() {
            Some(pages) => log::info!("Conversion finished: {} page(s), {} bytes", pages, artifact.len()),
            None => log::info!("Conversion finished: {} bytes", artifact.len()),
        }
        Ok(artifact)
    }
}

/// Read a file from disk, typing it by its extension.
pub fn load_source(path: &Path) -> Result<SourceFile> {
    load_source_within(path, u64::MAX)
}

/// Like [`load_source`], but a file larger than `max_bytes` is rejected
/// with `TooLarge` from its metadata, before any of it is read.
pub fn load_source_within(path: &Path, max_bytes: u64) -> Result<SourceFile> {
    let file = File::open(path)?;
    let size = file.metadata()?.len();
    if size > max_bytes {
        return Err(ConvertError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::with_capacity(size as usize);
    // The file may grow between the size check and the read.
    file.take(max_bytes.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > max_bytes {
        return Err(ConvertError::TooLarge {
            size: bytes.len() as u64,
            limit: max_bytes,
        });
    }
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();
    Ok(SourceFile::new(name, Some(mime_from_path(path)), bytes))
}
