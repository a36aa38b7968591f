//! Fixed typographic stylesheets. All lengths are CSS pixels.

use crate::markup::Align;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Serif,
    Sans,
    Mono,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub family: FontFamily,
    pub size: f32,
    pub color: [u8; 3],
    pub bold: bool,
    pub italic: bool,
    /// Line box height as a multiple of `size`.
    pub line_height: f32,
    pub space_before: f32,
    pub space_after: f32,
}

impl TextStyle {
    fn body(family: FontFamily, size: f32) -> Self {
        Self {
            family,
            size,
            color: [34, 34, 34],
            bold: false,
            italic: false,
            line_height: 1.5,
            space_before: 0.0,
            space_after: size * 0.75,
        }
    }

    fn heading(family: FontFamily, size: f32, color: [u8; 3]) -> Self {
        Self {
            family,
            size,
            color,
            bold: true,
            italic: false,
            line_height: 1.25,
            space_before: size * 0.9,
            space_after: size * 0.45,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteStyle {
    pub indent: f32,
    pub bar_width: f32,
    pub bar_color: [u8; 3],
    pub background: Option<[u8; 3]>,
    pub text_color: [u8; 3],
    pub italic: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableStyle {
    pub border_color: [u8; 3],
    pub border_width: f32,
    pub cell_padding: f32,
    pub header_fill: [u8; 3],
    pub font_scale: f32,
}

/// Deterministic style rules applied by the block layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Stylesheet {
    pub body: TextStyle,
    pub headings: [TextStyle; 6],
    pub title: TextStyle,
    pub subtitle: TextStyle,
    pub paragraph_align: Align,
    pub quote: QuoteStyle,
    pub intense_quote: QuoteStyle,
    pub table: TableStyle,
    pub list_indent: f32,
    pub mono: TextStyle,
    pub code_background: [u8; 3],
    pub rule_color: [u8; 3],
}

impl Stylesheet {
    /// Word-processor look: serif body, justified paragraphs, blue heading
    /// ramp, bordered tables and barred block quotes.
    pub fn document() -> Self {
        let family = FontFamily::Serif;
        let heading_color = [31, 56, 100];
        Self {
            body: TextStyle::body(family, 16.0),
            headings: [
                TextStyle::heading(family, 32.0, heading_color),
                TextStyle::heading(family, 26.0, heading_color),
                TextStyle::heading(family, 22.0, heading_color),
                TextStyle::heading(family, 19.0, [47, 84, 150]),
                TextStyle::heading(family, 17.0, [47, 84, 150]),
                TextStyle::heading(family, 16.0, [89, 89, 89]),
            ],
            title: TextStyle {
                line_height: 1.2,
                space_after: 24.0,
                ..TextStyle::heading(family, 40.0, [23, 54, 93])
            },
            subtitle: TextStyle {
                bold: false,
                italic: true,
                space_before: 0.0,
                space_after: 20.0,
                ..TextStyle::heading(family, 22.0, [79, 129, 189])
            },
            paragraph_align: Align::Justify,
            quote: QuoteStyle {
                indent: 24.0,
                bar_width: 4.0,
                bar_color: [204, 204, 204],
                background: None,
                text_color: [85, 85, 85],
                italic: true,
            },
            intense_quote: QuoteStyle {
                indent: 24.0,
                bar_width: 4.0,
                bar_color: [79, 129, 189],
                background: Some([237, 243, 250]),
                text_color: [54, 95, 145],
                italic: true,
            },
            table: TableStyle {
                border_color: [204, 204, 204],
                border_width: 1.0,
                cell_padding: 6.0,
                header_fill: [242, 242, 242],
                font_scale: 0.9,
            },
            list_indent: 32.0,
            mono: TextStyle::body(FontFamily::Mono, 14.0),
            code_background: [246, 246, 246],
            rule_color: [190, 190, 190],
        }
    }

    /// Plain web-page look: sans body, left aligned, lighter headings.
    pub fn html() -> Self {
        let family = FontFamily::Sans;
        let color = [17, 17, 17];
        Self {
            body: TextStyle::body(family, 15.0),
            headings: [
                TextStyle::heading(family, 30.0, color),
                TextStyle::heading(family, 24.0, color),
                TextStyle::heading(family, 20.0, color),
                TextStyle::heading(family, 17.0, color),
                TextStyle::heading(family, 15.0, color),
                TextStyle::heading(family, 14.0, color),
            ],
            title: TextStyle::heading(family, 30.0, color),
            subtitle: TextStyle::heading(family, 20.0, [85, 85, 85]),
            paragraph_align: Align::Start,
            quote: QuoteStyle {
                indent: 20.0,
                bar_width: 3.0,
                bar_color: [221, 221, 221],
                background: None,
                text_color: [68, 68, 68],
                italic: false,
            },
            intense_quote: QuoteStyle {
                indent: 20.0,
                bar_width: 3.0,
                bar_color: [120, 120, 120],
                background: Some([245, 245, 245]),
                text_color: [34, 34, 34],
                italic: false,
            },
            table: TableStyle {
                border_color: [170, 170, 170],
                border_width: 1.0,
                cell_padding: 4.0,
                header_fill: [235, 235, 235],
                font_scale: 1.0,
            },
            list_indent: 28.0,
            mono: TextStyle::body(FontFamily::Mono, 13.0),
            code_background: [244, 244, 244],
            rule_color: [200, 200, 200],
        }
    }

    /// Style for heading level 1..=6; out-of-range levels are clamped.
    pub fn heading(&self, level: u8) -> &TextStyle {
        let idx = level.clamp(1, 6) as usize - 1;
        &self.headings[idx]
    }
}
