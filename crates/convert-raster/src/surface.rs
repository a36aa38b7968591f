//! Off-screen render surfaces and the raster backend that paints them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ab_glyph::PxScale;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_text_mut};
use imageproc::rect::Rect;

use convert_core::error::Result;

use crate::fonts::fonts;
use crate::layout::{DisplayList, DrawItem};
use crate::paginate::Band;

/// Height in device pixels of one row of the band index.
const INDEX_ROW_HEIGHT: u32 = 512;

/// Owner of off-screen surfaces. Tracks how many are attached right now.
#[derive(Debug, Clone, Default)]
pub struct SurfaceHost {
    attached: Arc<AtomicUsize>,
}

impl SurfaceHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attached(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }
}

/// Laid-out content attached to a host for the length of one conversion.
/// Detaches itself when dropped, whichever way the conversion ends.
pub struct RenderSurface {
    host: SurfaceHost,
    list: DisplayList,
    scale: f32,
    /// Item indices per `INDEX_ROW_HEIGHT` rows of device pixels, in paint order.
    rows: Vec<Vec<usize>>,
}

impl RenderSurface {
    pub fn attach(host: &SurfaceHost, list: DisplayList, scale: f32) -> Self {
        let now = host.attached.fetch_add(1, Ordering::SeqCst) + 1;
        log::debug!(
            "Attached render surface {}x{} css px at {}x ({} attached)",
            list.width,
            list.height,
            scale,
            now
        );
        let rows = index_rows(&list, scale);
        Self {
            host: host.clone(),
            list,
            scale,
            rows,
        }
    }

    /// Items that reach into `band`, in paint order.
    pub fn items_in(&self, band: Band) -> Vec<&DrawItem> {
        let band_top = band.top as f32;
        let band_bottom = band.top.saturating_add(band.height) as f32;
        let first = (band.top / INDEX_ROW_HEIGHT) as usize;
        let last = (band.top.saturating_add(band.height) / INDEX_ROW_HEIGHT) as usize;

        let mut hits: Vec<usize> = self
            .rows
            .iter()
            .skip(first)
            .take(last - first + 1)
            .flatten()
            .copied()
            .collect();
        hits.sort_unstable();
        hits.dedup();

        hits.into_iter()
            .map(|i| &self.list.items[i])
            .filter(|item| {
                let (top, bottom) = item.vertical_span();
                bottom * self.scale >= band_top && top * self.scale <= band_bottom
            })
            .collect()
    }

    pub fn display_list(&self) -> &DisplayList {
        &self.list
    }

    /// Device pixels per CSS pixel.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn device_width(&self) -> u32 {
        ((self.list.width * self.scale).ceil() as u32).max(1)
    }

    pub fn device_height(&self) -> u32 {
        ((self.list.height * self.scale).ceil() as u32).max(1)
    }
}

fn index_rows(list: &DisplayList, scale: f32) -> Vec<Vec<usize>> {
    let mut rows: Vec<Vec<usize>> = Vec::new();
    for (i, item) in list.items.iter().enumerate() {
        let (top, bottom) = item.vertical_span();
        let first = (top * scale).max(0.0) as u32 / INDEX_ROW_HEIGHT;
        let last = (bottom * scale).max(0.0) as u32 / INDEX_ROW_HEIGHT;
        let (first, last) = (first as usize, last.max(first) as usize);
        if rows.len() <= last {
            rows.resize_with(last + 1, Vec::new);
        }
        for row in &mut rows[first..=last] {
            row.push(i);
        }
    }
    rows
}

impl Drop for RenderSurface {
    fn drop(&mut self) {
        self.host.attached.fetch_sub(1, Ordering::SeqCst);
        log::debug!("Detached render surface");
    }
}

/// A rasterized bitmap. Never persisted.
#[derive(Debug, Clone)]
pub struct RenderedContent {
    image: RgbImage,
}

impl RenderedContent {
    pub fn new(image: RgbImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbImage {
        &self.image
    }

    pub fn into_image(self) -> RgbImage {
        self.image
    }

    /// Copy of the rows covered by `band`, clamped to the bitmap.
    pub fn crop(&self, band: Band) -> RgbImage {
        image::imageops::crop_imm(&self.image, 0, band.top, self.image.width(), band.height)
            .to_image()
    }
}

/// Paints one band of a surface into a bitmap.
pub trait RasterBackend: Send + Sync {
    fn rasterize(&self, surface: &RenderSurface, band: Band) -> Result<RenderedContent>;
}

/// Backend drawing glyphs with `ab_glyph` through `imageproc` onto white.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlyphRasterizer;

impl RasterBackend for GlyphRasterizer {
    fn rasterize(&self, surface: &RenderSurface, band: Band) -> Result<RenderedContent> {
        let fonts = fonts()?;
        let scale = surface.scale();
        let mut canvas = RgbImage::from_pixel(
            surface.device_width(),
            band.height.max(1),
            Rgb([255, 255, 255]),
        );
        let band_top = band.top as f32;

        for item in surface.items_in(band) {
            match item {
                DrawItem::Rect { x, y, w, h, color } => {
                    let rect = Rect::at((x * scale).round() as i32, (y * scale - band_top).round() as i32)
                        .of_size(
                            (w * scale).round().max(1.0) as u32,
                            (h * scale).round().max(1.0) as u32,
                        );
                    draw_filled_rect_mut(&mut canvas, rect, Rgb(*color));
                }
                DrawItem::Text {
                    x,
                    y,
                    size,
                    face,
                    color,
                    text,
                } => {
                    draw_text_mut(
                        &mut canvas,
                        Rgb(*color),
                        (x * scale).round() as i32,
                        (y * scale - band_top).round() as i32,
                        PxScale::from(size * scale),
                        fonts.face(*face),
                        text,
                    );
                }
            }
        }
        Ok(RenderedContent::new(canvas))
    }
}
