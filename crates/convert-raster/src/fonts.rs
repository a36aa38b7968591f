//! DejaVu faces for rasterizing and text measurement.

use ab_glyph::{Font, FontArc, PxScale, ScaleFont};
use once_cell::sync::OnceCell;

use convert_core::error::{ConvertError, Result};
use convert_output_pdf::fonts::{
    SANS, SANS_BOLD, SANS_BOLD_OBLIQUE, SANS_MONO, SANS_OBLIQUE, SERIF, SERIF_BOLD,
    SERIF_BOLD_ITALIC, SERIF_ITALIC,
};

use crate::stylesheet::FontFamily;

/// Identifies one concrete face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceId {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
}

impl FaceId {
    pub fn new(family: FontFamily, bold: bool, italic: bool) -> Self {
        Self {
            family,
            bold,
            italic,
        }
    }
}

/// Vertical metrics of a face at a given size, in pixels.
#[derive(Debug, Clone, Copy)]
pub struct LineMetrics {
    pub ascent: f32,
    pub descent: f32,
}

pub struct FontSet {
    serif: [FontArc; 4],
    sans: [FontArc; 4],
    mono: FontArc,
}

static FONTS: OnceCell<FontSet> = OnceCell::new();

/// The process-wide font set, loaded on first use.
pub fn fonts() -> Result<&'static FontSet> {
    FONTS.get_or_try_init(FontSet::load)
}

fn load_face(data: &'static [u8], name: &str) -> Result<FontArc> {
    FontArc::try_from_slice(data)
        .map_err(|e| ConvertError::Render(format!("Cannot load font {}: {}", name, e)))
}

impl FontSet {
    fn load() -> Result<Self> {
        Ok(Self {
            serif: [
                load_face(SERIF, "DejaVuSerif")?,
                load_face(SERIF_BOLD, "DejaVuSerif-Bold")?,
                load_face(SERIF_ITALIC, "DejaVuSerif-Italic")?,
                load_face(SERIF_BOLD_ITALIC, "DejaVuSerif-BoldItalic")?,
            ],
            sans: [
                load_face(SANS, "DejaVuSans")?,
                load_face(SANS_BOLD, "DejaVuSans-Bold")?,
                load_face(SANS_OBLIQUE, "DejaVuSans-Oblique")?,
                load_face(SANS_BOLD_OBLIQUE, "DejaVuSans-BoldOblique")?,
            ],
            mono: load_face(SANS_MONO, "DejaVuSansMono")?,
        })
    }

    pub fn face(&self, id: FaceId) -> &FontArc {
        let idx = usize::from(id.bold) + 2 * usize::from(id.italic);
        match id.family {
            FontFamily::Serif => &self.serif[idx],
            FontFamily::Sans => &self.sans[idx],
            FontFamily::Mono => &self.mono,
        }
    }

    /// Advance width of `text` including kerning.
    pub fn measure(&self, id: FaceId, size: f32, text: &str) -> f32 {
        let font = self.face(id).as_scaled(PxScale::from(size));
        let mut width = 0.0;
        let mut prev = None;
        for c in text.chars() {
            let glyph = font.glyph_id(c);
            if let Some(p) = prev {
                width += font.kern(p, glyph);
            }
            width += font.h_advance(glyph);
            prev = Some(glyph);
        }
        width
    }

    pub fn line_metrics(&self, id: FaceId, size: f32) -> LineMetrics {
        let font = self.face(id).as_scaled(PxScale::from(size));
        LineMetrics {
            ascent: font.ascent(),
            descent: font.descent(),
        }
    }
}
