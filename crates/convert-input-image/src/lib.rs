//! Image renderer: one centered bitmap on one page.
//!
//! The page turns landscape when the image is wider than tall. The image is
//! scaled to 90% of the largest size that fits and centered on both axes;
//! bitmaps much larger than the output quality needs are downscaled first.

pub mod rescale;

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageFormat, Rgb, RgbImage};

use convert_core::artifact::PdfArtifact;
use convert_core::error::{ConvertError, Result};
use convert_core::geometry::{
    fit_centered, Orientation, Placement, RenderTarget, CSS_PX_PER_PT, IMAGE_FIT_FACTOR,
};
use convert_core::options::ConversionOptions;
use convert_core::plugin::Renderer;
use convert_core::source::{SourceFile, SourceFormat};
use convert_output_pdf::PdfWriter;

const JPEG_QUALITY: u8 = 90;

pub struct ImageRenderer;

impl Renderer for ImageRenderer {
    fn name(&self) -> &str {
        "Image"
    }

    fn formats(&self) -> &[SourceFormat] {
        &[SourceFormat::Image]
    }

    fn render(&self, source: &SourceFile, options: &ConversionOptions) -> Result<PdfArtifact> {
        log::info!("Rendering image: {}", source.name());
        render_image(source.bytes(), source.stem(), options)
    }
}

/// Page and placement for an image of `width` x `height` pixels.
pub fn layout_image(width: u32, height: u32, options: &ConversionOptions) -> (RenderTarget, Placement) {
    let target = options
        .render_target()
        .with_orientation(Orientation::for_image(width, height));
    let placement = fit_centered(width, height, target.width, target.height, IMAGE_FIT_FACTOR);
    (target, placement)
}

pub fn render_image(bytes: &[u8], title: &str, options: &ConversionOptions) -> Result<PdfArtifact> {
    let source_format = image::guess_format(bytes).ok();
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| ConvertError::Decode(format!("Cannot decode image: {}", e)))?;
    let (width, height) = decoded.dimensions();
    if width == 0 || height == 0 {
        return Err(ConvertError::Decode("Image has no pixels".into()));
    }

    let (target, placement) = layout_image(width, height, options);
    log::debug!(
        "Placing {}x{} image at ({:.1}, {:.1}) size {:.1}x{:.1} pt ({:?})",
        width,
        height,
        placement.x,
        placement.y,
        placement.width,
        placement.height,
        target.orientation()
    );

    let device = target.pixel_ratio * CSS_PX_PER_PT;
    let max_w = (placement.width * device).ceil() as u32;
    let max_h = (placement.height * device).ceil() as u32;
    let rgb = flatten(decoded);
    let rgb = rescale::downscale(&rgb, max_w, max_h).unwrap_or(rgb);
    let data = encode(rgb, source_format == Some(ImageFormat::Jpeg))?;

    let mut writer = PdfWriter::new(title);
    writer.begin_page(target.width, target.height);
    writer.image(&data, placement.x, placement.y, placement.width, placement.height)?;
    writer.finish()
}

/// Drop the alpha channel by compositing onto white.
fn flatten(image: DynamicImage) -> RgbImage {
    if !image.color().has_alpha() {
        return image.to_rgb8();
    }
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let a = a as u16;
        let blend = |c: u8| ((c as u16 * a + 255 * (255 - a)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

fn encode(image: RgbImage, as_jpeg: bool) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let result = if as_jpeg {
        JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY).encode_image(&image)
    } else {
        DynamicImage::ImageRgb8(image).write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
    };
    result.map_err(|e| ConvertError::Render(format!("Cannot encode image for embedding: {}", e)))?;
    Ok(buf)
}
