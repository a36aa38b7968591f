//! Page geometry: output page dimensions, margins, unit conversion and
//! image placement.
//!
//! All values are PDF points (1/72 inch) measured from the top-left corner of
//! the page. Renderers convert to PDF's bottom-left origin only when emitting
//! drawing operations.

use serde::{Deserialize, Serialize};

/// CSS pixels per PDF point (96 dpi layout vs. 72 dpi page space).
pub const CSS_PX_PER_PT: f32 = 96.0 / 72.0;

/// Fraction of the page an image may occupy; the remainder is a margin band
/// split evenly around the image.
pub const IMAGE_FIT_FACTOR: f32 = 0.9;

/// Named page formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
}

impl PageSize {
    /// Portrait (width, height) in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A4 => (595.28, 841.89),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "a3" => Some(PageSize::A3),
            "a4" => Some(PageSize::A4),
            "a5" => Some(PageSize::A5),
            "letter" => Some(PageSize::Letter),
            "legal" => Some(PageSize::Legal),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// Landscape only when the image is strictly wider than tall.
    pub fn for_image(width: u32, height: u32) -> Self {
        if width > height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }
}

/// The fixed description every output page conforms to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderTarget {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    /// Device pixels per CSS pixel used when rasterizing content.
    pub pixel_ratio: f32,
}

impl RenderTarget {
    pub fn new(size: PageSize, margin: f32, pixel_ratio: f32) -> Self {
        let (width, height) = size.dimensions();
        Self {
            width,
            height,
            margin,
            pixel_ratio,
        }
    }

    pub fn orientation(&self) -> Orientation {
        if self.width > self.height {
            Orientation::Landscape
        } else {
            Orientation::Portrait
        }
    }

    /// Same page rotated (if needed) to the requested orientation.
    pub fn with_orientation(self, orientation: Orientation) -> Self {
        if self.orientation() == orientation {
            self
        } else {
            Self {
                width: self.height,
                height: self.width,
                ..self
            }
        }
    }

    pub fn printable_width(&self) -> f32 {
        (self.width - 2.0 * self.margin).max(1.0)
    }

    pub fn printable_height(&self) -> f32 {
        (self.height - 2.0 * self.margin).max(1.0)
    }

    /// Printable width expressed in CSS pixels, the layout width for
    /// rasterized content.
    pub fn content_width_px(&self) -> f32 {
        self.printable_width() * CSS_PX_PER_PT
    }

    /// Printable height in CSS pixels: the per-page content budget.
    pub fn content_height_px(&self) -> f32 {
        self.printable_height() * CSS_PX_PER_PT
    }
}

impl Default for RenderTarget {
    fn default() -> Self {
        Self::new(PageSize::A4, 40.0, 2.0)
    }
}

/// Where a scaled image lands on a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale: f32,
}

/// Scale an image uniformly to `factor` of the largest size that fits the
/// page, then center it on both axes.
pub fn fit_centered(
    image_width: u32,
    image_height: u32,
    page_width: f32,
    page_height: f32,
    factor: f32,
) -> Placement {
    let iw = image_width.max(1) as f32;
    let ih = image_height.max(1) as f32;
    let scale = (page_width / iw).min(page_height / ih) * factor;
    let width = iw * scale;
    let height = ih * scale;
    Placement {
        x: (page_width - width) / 2.0,
        y: (page_height - height) / 2.0,
        width,
        height,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_default_target() {
        let target = RenderTarget::default();
        assert_eq!(target.width, 595.28);
        assert_eq!(target.height, 841.89);
        assert!((target.printable_width() - 515.28).abs() < 1e-3);
        assert_eq!(target.orientation(), Orientation::Portrait);
    }

    #[test]
    fn test_with_orientation_swaps_once() {
        let target = RenderTarget::default().with_orientation(Orientation::Landscape);
        assert_eq!(target.width, 841.89);
        assert_eq!(target.height, 595.28);
        let again = target.with_orientation(Orientation::Landscape);
        assert_eq!(again, target);
    }

    #[test]
    fn test_orientation_for_image() {
        assert_eq!(Orientation::for_image(800, 600), Orientation::Landscape);
        assert_eq!(Orientation::for_image(600, 800), Orientation::Portrait);
        assert_eq!(Orientation::for_image(500, 500), Orientation::Portrait);
    }

    #[test]
    fn test_fit_centered_reserves_margin_band() {
        let p = fit_centered(1000, 1000, 595.28, 841.89, IMAGE_FIT_FACTOR);
        assert!((p.width - 595.28 * 0.9).abs() < 1e-3);
        assert!((p.x - 595.28 * 0.05).abs() < 1e-3);
        assert!((p.y - (841.89 - p.height) / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_fit_centered_never_overflows() {
        let pages = [(595.28, 841.89), (841.89, 595.28), (612.0, 1008.0)];
        let sizes = [1u32, 2, 3, 17, 99, 640, 1023, 4096, 12000];
        for &(pw, ph) in &pages {
            for &w in &sizes {
                for &h in &sizes {
                    let p = fit_centered(w, h, pw, ph, IMAGE_FIT_FACTOR);
                    assert!(p.x >= 0.0 && p.y >= 0.0, "{w}x{h} on {pw}x{ph}");
                    assert!(p.x + p.width <= pw + 1e-3, "{w}x{h} on {pw}x{ph}");
                    assert!(p.y + p.height <= ph + 1e-3, "{w}x{h} on {pw}x{ph}");
                }
            }
        }
    }

    #[test]
    fn test_page_size_names() {
        assert_eq!(PageSize::from_name("Letter"), Some(PageSize::Letter));
        assert_eq!(PageSize::from_name("b5"), None);
    }
}
