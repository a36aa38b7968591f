//! Embedded DejaVu faces. The PDF writer embeds the Sans faces so any
//! Unicode text reaches the page intact; the rasterizer draws with all of them.

pub const SANS: &[u8] = include_bytes!("../assets/DejaVuSans.ttf");
pub const SANS_BOLD: &[u8] = include_bytes!("../assets/DejaVuSans-Bold.ttf");
pub const SANS_OBLIQUE: &[u8] = include_bytes!("../assets/DejaVuSans-Oblique.ttf");
pub const SANS_BOLD_OBLIQUE: &[u8] = include_bytes!("../assets/DejaVuSans-BoldOblique.ttf");
pub const SERIF: &[u8] = include_bytes!("../assets/DejaVuSerif.ttf");
pub const SERIF_BOLD: &[u8] = include_bytes!("../assets/DejaVuSerif-Bold.ttf");
pub const SERIF_ITALIC: &[u8] = include_bytes!("../assets/DejaVuSerif-Italic.ttf");
pub const SERIF_BOLD_ITALIC: &[u8] = include_bytes!("../assets/DejaVuSerif-BoldItalic.ttf");
pub const SANS_MONO: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

/// Face used for vector text in the PDF.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PdfFont {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl PdfFont {
    pub const ALL: [PdfFont; 4] = [
        PdfFont::Regular,
        PdfFont::Bold,
        PdfFont::Italic,
        PdfFont::BoldItalic,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PdfFont::Regular => "DejaVuSans",
            PdfFont::Bold => "DejaVuSans-Bold",
            PdfFont::Italic => "DejaVuSans-Oblique",
            PdfFont::BoldItalic => "DejaVuSans-BoldOblique",
        }
    }

    pub fn bytes(self) -> &'static [u8] {
        match self {
            PdfFont::Regular => SANS,
            PdfFont::Bold => SANS_BOLD,
            PdfFont::Italic => SANS_OBLIQUE,
            PdfFont::BoldItalic => SANS_BOLD_OBLIQUE,
        }
    }
}
