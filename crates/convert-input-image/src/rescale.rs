//! Downscaling of oversized bitmaps before they are embedded.
//!
//! Uses fast_image_resize for SIMD-accelerated Lanczos3 resizing and falls
//! back to the `image` crate when it cannot handle the buffer.

use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, Resizer};
use image::imageops::FilterType;
use image::RgbImage;

/// Largest size with the same aspect ratio that fits in `max_w` x `max_h`.
pub fn fit_dimensions(w: u32, h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    let ratio = (max_w as f64 / w.max(1) as f64).min(max_h as f64 / h.max(1) as f64);
    let new_w = ((w as f64 * ratio).round() as u32).max(1);
    let new_h = ((h as f64 * ratio).round() as u32).max(1);
    (new_w, new_h)
}

/// Shrink `src` to fit `max_w` x `max_h`. Returns `None` when it already fits.
pub fn downscale(src: &RgbImage, max_w: u32, max_h: u32) -> Option<RgbImage> {
    let (w, h) = src.dimensions();
    if w <= max_w && h <= max_h {
        return None;
    }
    let (new_w, new_h) = fit_dimensions(w, h, max_w, max_h);

    let mut dst = Image::new(new_w, new_h, PixelType::U8x3);
    let mut resizer = Resizer::new();
    let resized = resizer
        .resize(src, &mut dst, None)
        .map_err(|e| e.to_string())
        .and_then(|()| {
            RgbImage::from_raw(new_w, new_h, dst.into_vec())
                .ok_or_else(|| "buffer size mismatch".to_string())
        });

    let out = match resized {
        Ok(img) => img,
        Err(e) => {
            log::warn!(
                "fast_image_resize failed ({}x{} -> {}x{}): {}, falling back",
                w,
                h,
                new_w,
                new_h,
                e
            );
            image::imageops::resize(src, new_w, new_h, FilterType::Lanczos3)
        }
    };
    log::debug!("Downscaled image from {}x{} to {}x{}", w, h, new_w, new_h);
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_dimensions_keeps_aspect() {
        assert_eq!(fit_dimensions(4000, 2000, 1000, 1000), (1000, 500));
        assert_eq!(fit_dimensions(1000, 3000, 600, 600), (200, 600));
        assert_eq!(fit_dimensions(10_000, 1, 100, 100), (100, 1));
    }

    #[test]
    fn test_small_image_untouched() {
        let img = RgbImage::new(50, 40);
        assert!(downscale(&img, 100, 100).is_none());
    }

    #[test]
    fn test_large_image_shrinks() {
        let img = RgbImage::from_pixel(800, 400, image::Rgb([10, 200, 30]));
        let out = downscale(&img, 200, 200).unwrap();
        assert_eq!(out.dimensions(), (200, 100));
        let px = out.get_pixel(100, 50).0;
        assert!((px[1] as i32 - 200).abs() <= 2);
    }
}
