//! HTML renderer.
//!
//! The page is decoded (BOM, `<meta charset>`, then a Windows-1252
//! fallback), parsed into blocks and rasterized with the plain web-page
//! stylesheet. The `<title>` becomes the PDF title, else the file name.

use std::sync::Arc;

use convert_core::artifact::PdfArtifact;
use convert_core::error::Result;
use convert_core::options::ConversionOptions;
use convert_core::plugin::Renderer;
use convert_core::source::{SourceFile, SourceFormat};
use convert_raster::{html_title, parse_html, render_markup, RasterBackend, Stylesheet, SurfaceHost};
use convert_utils::encoding::decode_html;

pub struct HtmlRenderer {
    host: SurfaceHost,
    backend: Arc<dyn RasterBackend>,
}

impl HtmlRenderer {
    pub fn new(host: SurfaceHost, backend: Arc<dyn RasterBackend>) -> Self {
        Self { host, backend }
    }
}

impl Renderer for HtmlRenderer {
    fn name(&self) -> &str {
        "HTML"
    }

    fn formats(&self) -> &[SourceFormat] {
        &[SourceFormat::Html]
    }

    fn render(&self, source: &SourceFile, options: &ConversionOptions) -> Result<PdfArtifact> {
        log::info!("Rendering HTML: {}", source.name());
        let (html, encoding) = decode_html(source.bytes());
        log::debug!("Decoded {} as {}", source.name(), encoding);

        let title = html_title(&html).unwrap_or_else(|| source.stem().to_string());
        let blocks = parse_html(&html);
        log::debug!("Parsed {} top-level blocks", blocks.len());

        render_markup(
            &blocks,
            &Stylesheet::html(),
            &title,
            options,
            self.backend.as_ref(),
            &self.host,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convert_core::error::ConvertError;
    use convert_core::options::Quality;
    use convert_raster::paginate::Band;
    use convert_raster::surface::{RenderSurface, RenderedContent};
    use convert_raster::GlyphRasterizer;

    struct BrokenCanvas;

    impl RasterBackend for BrokenCanvas {
        fn rasterize(&self, _: &RenderSurface, _: Band) -> Result<RenderedContent> {
            Err(ConvertError::Render("canvas unavailable".into()))
        }
    }

    fn draft() -> ConversionOptions {
        ConversionOptions {
            quality: Quality::Draft,
            ..ConversionOptions::default()
        }
    }

    #[test]
    fn test_render_simple_page() {
        let html = b"<html><head><title>Menu</title></head><body><h1>Lunch</h1><p>Soup</p></body></html>";
        let source = SourceFile::new("menu.html", Some("text/html".into()), html.to_vec());
        let renderer = HtmlRenderer::new(SurfaceHost::new(), Arc::new(GlyphRasterizer));
        let artifact = renderer.render(&source, &draft()).unwrap();
        assert_eq!(artifact.page_count(), Some(1));
    }

    #[test]
    fn test_long_page_is_paginated() {
        let mut html = String::from("<html><body>");
        for i in 0..150 {
            html.push_str(&format!("<p>Row {} of the listing.</p>", i));
        }
        html.push_str("</body></html>");
        let source = SourceFile::new("list.htm", None, html.into_bytes());
        let renderer = HtmlRenderer::new(SurfaceHost::new(), Arc::new(GlyphRasterizer));
        let artifact = renderer.render(&source, &draft()).unwrap();
        assert!(artifact.page_count().unwrap() > 1);
    }

    #[test]
    fn test_render_failure_releases_surface() {
        let host = SurfaceHost::new();
        let renderer = HtmlRenderer::new(host.clone(), Arc::new(BrokenCanvas));
        let source = SourceFile::new("x.html", None, b"<p>hi</p>".to_vec());
        let err = renderer.render(&source, &draft()).unwrap_err();
        assert!(err.is_retriable());
        assert_eq!(host.attached(), 0);
    }
}
