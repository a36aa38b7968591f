//! Rasterize-and-paginate: turns laid-out markup into image pages.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, RgbImage};
use rayon::prelude::*;

use convert_core::artifact::PdfArtifact;
use convert_core::error::{ConvertError, Result};
use convert_core::geometry::{RenderTarget, CSS_PX_PER_PT};
use convert_core::options::ConversionOptions;
use convert_output_pdf::PdfWriter;

use crate::fonts::fonts;
use crate::layout::layout;
use crate::markup::Block;
use crate::paginate::{Band, Paginator};
use crate::stylesheet::Stylesheet;
use crate::surface::{RasterBackend, RenderSurface, SurfaceHost};

/// Lay out `blocks`, rasterize them and emit one PDF page per band.
///
/// Content taller than `options.large_document_threshold` CSS pixels is
/// rasterized band by band; anything shorter is rasterized once and cut
/// into bands. Either way pages are appended in band order, and the render
/// surface is detached before this returns, on success or failure. A
/// passed `options.deadline` stops the work between bands with `Timeout`.
pub fn render_markup(
    blocks: &[Block],
    sheet: &Stylesheet,
    title: &str,
    options: &ConversionOptions,
    backend: &dyn RasterBackend,
    host: &SurfaceHost,
) -> Result<PdfArtifact> {
    let target = options.render_target();
    let list = layout(blocks, sheet, target.content_width_px(), fonts()?);
    options.check_deadline()?;
    let chunked = list.height > options.large_document_threshold as f32;

    let surface = RenderSurface::attach(host, list, target.pixel_ratio);
    let budget = (target.content_height_px() * surface.scale()).floor() as u32;
    let paginator = Paginator::new(budget);
    let bands = paginator.bands(surface.device_height());

    log::info!(
        "Rasterizing {} css px of content into {} page(s) ({} mode)",
        surface.display_list().height,
        bands.len(),
        if chunked { "chunked" } else { "simple" }
    );

    let pages = if chunked {
        render_chunked(&surface, &bands, backend, options)?
    } else {
        render_simple(&surface, &bands, backend, options)?
    };
    drop(surface);

    let mut writer = PdfWriter::new(title);
    for (band, png) in bands.iter().zip(pages) {
        place_band(&mut writer, &target, *band, &png)?;
    }
    if options.number_pages {
        writer.number_pages(target.margin)?;
    }
    writer.finish()
}

fn render_chunked(
    surface: &RenderSurface,
    bands: &[Band],
    backend: &dyn RasterBackend,
    options: &ConversionOptions,
) -> Result<Vec<Vec<u8>>> {
    let mut pages = Vec::with_capacity(bands.len());
    for band in bands {
        options.check_deadline()?;
        log::debug!(
            "Rendering chunk {}/{} at offset {}",
            band.index + 1,
            bands.len(),
            band.top
        );
        let content = backend.rasterize(surface, *band)?;
        pages.push(encode_png(content.into_image())?);
    }
    Ok(pages)
}

fn render_simple(
    surface: &RenderSurface,
    bands: &[Band],
    backend: &dyn RasterBackend,
    options: &ConversionOptions,
) -> Result<Vec<Vec<u8>>> {
    let whole = Band {
        index: 0,
        top: 0,
        height: surface.device_height(),
    };
    let content = backend.rasterize(surface, whole)?;
    options.check_deadline()?;
    bands
        .par_iter()
        .map(|band| encode_png(content.crop(*band)))
        .collect()
}

fn place_band(writer: &mut PdfWriter, target: &RenderTarget, band: Band, png: &[u8]) -> Result<()> {
    let height = band.height as f32 / (target.pixel_ratio * CSS_PX_PER_PT);
    writer.begin_page(target.width, target.height);
    writer.image(
        png,
        target.margin,
        target.margin,
        target.printable_width(),
        height.min(target.printable_height()),
    )
}

fn encode_png(image: RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| ConvertError::Render(format!("Cannot encode page bitmap: {}", e)))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::markup::parse_html;
    use crate::surface::{GlyphRasterizer, RenderedContent};
    use convert_core::options::Quality;

    struct FailingBackend;

    impl RasterBackend for FailingBackend {
        fn rasterize(&self, _: &RenderSurface, _: Band) -> Result<RenderedContent> {
            Err(ConvertError::Render("canvas lost".into()))
        }
    }

    /// Fails on the second chunk to exercise mid-document failure.
    struct FlakyBackend {
        calls: Mutex<usize>,
    }

    impl RasterBackend for FlakyBackend {
        fn rasterize(&self, surface: &RenderSurface, band: Band) -> Result<RenderedContent> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls == 2 {
                return Err(ConvertError::Render("out of memory".into()));
            }
            GlyphRasterizer.rasterize(surface, band)
        }
    }

    struct SleepyBackend(Duration);

    impl RasterBackend for SleepyBackend {
        fn rasterize(&self, surface: &RenderSurface, band: Band) -> Result<RenderedContent> {
            std::thread::sleep(self.0);
            GlyphRasterizer.rasterize(surface, band)
        }
    }

    #[derive(Default)]
    struct RecordingBackend {
        seen: Mutex<Vec<Band>>,
    }

    impl RasterBackend for RecordingBackend {
        fn rasterize(&self, surface: &RenderSurface, band: Band) -> Result<RenderedContent> {
            self.seen.lock().unwrap().push(band);
            GlyphRasterizer.rasterize(surface, band)
        }
    }

    fn draft() -> ConversionOptions {
        ConversionOptions {
            quality: Quality::Draft,
            ..ConversionOptions::default()
        }
    }

    fn long_document() -> Vec<Block> {
        let mut html = String::from("<h1>Quarterly report</h1>");
        for i in 0..80 {
            html.push_str(&format!("<p>Paragraph {} of the report body.</p>", i));
        }
        parse_html(&html)
    }

    #[test]
    fn test_short_document_is_one_page() {
        let host = SurfaceHost::new();
        let blocks = parse_html("<h1>Hi</h1><p>Short note.</p>");
        let artifact = render_markup(
            &blocks,
            &Stylesheet::html(),
            "note",
            &draft(),
            &GlyphRasterizer,
            &host,
        )
        .unwrap();
        assert_eq!(artifact.page_count(), Some(1));
        assert!(artifact.bytes().starts_with(b"%PDF"));
        assert_eq!(host.attached(), 0);
    }

    #[test]
    fn test_failure_detaches_surface() {
        let host = SurfaceHost::new();
        let err = render_markup(
            &long_document(),
            &Stylesheet::document(),
            "report",
            &draft(),
            &FailingBackend,
            &host,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Render(_)));
        assert_eq!(host.attached(), 0);
    }

    #[test]
    fn test_failure_mid_chunk_detaches_surface() {
        let host = SurfaceHost::new();
        let options = ConversionOptions {
            large_document_threshold: 100,
            ..draft()
        };
        let backend = FlakyBackend {
            calls: Mutex::new(0),
        };
        let result = render_markup(
            &long_document(),
            &Stylesheet::document(),
            "report",
            &options,
            &backend,
            &host,
        );
        assert!(result.is_err());
        assert_eq!(host.attached(), 0);
    }

    #[test]
    fn test_passed_deadline_stops_between_bands() {
        let host = SurfaceHost::new();
        let options = ConversionOptions {
            large_document_threshold: 100,
            render_timeout_secs: Some(1),
            deadline: Some(Instant::now() + Duration::from_millis(100)),
            ..draft()
        };
        let backend = SleepyBackend(Duration::from_millis(150));
        let err = render_markup(
            &long_document(),
            &Stylesheet::document(),
            "report",
            &options,
            &backend,
            &host,
        )
        .unwrap_err();
        assert!(matches!(err, ConvertError::Timeout(d) if d == Duration::from_secs(1)));
        assert_eq!(host.attached(), 0);
    }

    #[test]
    fn test_chunked_bands_in_order() {
        let host = SurfaceHost::new();
        let options = ConversionOptions {
            large_document_threshold: 100,
            ..draft()
        };
        let backend = RecordingBackend::default();
        let artifact = render_markup(
            &long_document(),
            &Stylesheet::document(),
            "report",
            &options,
            &backend,
            &host,
        )
        .unwrap();

        let seen = backend.seen.lock().unwrap();
        assert!(seen.len() > 1);
        for (i, band) in seen.iter().enumerate() {
            assert_eq!(band.index, i);
        }
        assert!(seen.windows(2).all(|w| w[0].top < w[1].top));
        assert_eq!(artifact.page_count(), Some(seen.len()));
    }

    #[test]
    fn test_simple_mode_rasterizes_once() {
        let host = SurfaceHost::new();
        let options = ConversionOptions {
            large_document_threshold: u32::MAX,
            ..draft()
        };
        let backend = RecordingBackend::default();
        let artifact = render_markup(
            &long_document(),
            &Stylesheet::document(),
            "report",
            &options,
            &backend,
            &host,
        )
        .unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].top, 0);
        let target = options.render_target();
        let budget = (target.content_height_px() * target.pixel_ratio).floor() as u32;
        let expected = Paginator::new(budget).page_count(seen[0].height);
        assert!(expected > 1);
        assert_eq!(artifact.page_count(), Some(expected));
    }

    #[test]
    fn test_both_modes_agree_on_page_count() {
        let blocks = long_document();
        let host = SurfaceHost::new();
        let render = |threshold| {
            let options = ConversionOptions {
                large_document_threshold: threshold,
                ..draft()
            };
            render_markup(
                &blocks,
                &Stylesheet::document(),
                "report",
                &options,
                &GlyphRasterizer,
                &host,
            )
            .unwrap()
            .page_count()
        };
        assert_eq!(render(0), render(u32::MAX));
    }
}
