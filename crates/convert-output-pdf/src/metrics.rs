//! Glyph advance widths for the embedded text faces and a
//! measurement-aware line wrapper.

use ab_glyph::{Font, FontRef};
use once_cell::sync::OnceCell;

use crate::fonts::PdfFont;

/// Width (1/1000 em) used when a face cannot be parsed.
const FALLBACK_WIDTH: f32 = 556.0;

static FACES: OnceCell<Vec<Option<FontRef<'static>>>> = OnceCell::new();

fn face(font: PdfFont) -> Option<&'static FontRef<'static>> {
    let faces = FACES.get_or_init(|| {
        PdfFont::ALL
            .iter()
            .map(|f| match FontRef::try_from_slice(f.bytes()) {
                Ok(face) => Some(face),
                Err(e) => {
                    log::warn!("Cannot parse {} for measuring: {}", f.name(), e);
                    None
                }
            })
            .collect()
    });
    let slot = PdfFont::ALL.iter().position(|f| *f == font)?;
    faces[slot].as_ref()
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, font: PdfFont, size: f32) -> f32 {
    match face(font) {
        Some(face) => {
            let em = face.units_per_em().unwrap_or(1000.0);
            let units: f32 = text
                .chars()
                .map(|c| face.h_advance_unscaled(face.glyph_id(c)))
                .sum();
            units * size / em
        }
        None => text.chars().count() as f32 * FALLBACK_WIDTH * size / 1000.0,
    }
}

/// Greedy word wrap to `max_width` points. Words wider than a whole line are
/// broken between characters. An empty input yields one empty line.
pub fn wrap_text(line: &str, max_width: f32, font: PdfFont, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if text_width(&candidate, font, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, font, size) <= max_width {
            current = word.to_string();
        } else {
            for c in word.chars() {
                current.push(c);
                if text_width(&current, font, size) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(c);
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
