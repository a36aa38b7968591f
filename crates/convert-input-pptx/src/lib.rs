//! Presentation renderer.
//!
//! Slide content is not extracted. The output has three slide-like pages: a
//! filled title page naming the source file, a sample content page and a
//! closing page with the conversion date. The slide count is shown when the
//! input is a readable `.pptx` archive.

use chrono::Local;
use once_cell::sync::Lazy;
use regex::Regex;

use convert_core::artifact::PdfArtifact;
use convert_core::error::Result;
use convert_core::options::ConversionOptions;
use convert_core::plugin::Renderer;
use convert_core::source::{SourceFile, SourceFormat};
use convert_output_pdf::metrics::{text_width, wrap_text};
use convert_output_pdf::{PdfFont, PdfWriter, Rgb8};
use convert_utils::archive::ZipReader;

const PT_PER_MM: f32 = 72.0 / 25.4;
const ACCENT: Rgb8 = Rgb8(70, 130, 180);
const HEADER_BAR: Rgb8 = Rgb8(240, 240, 240);
const FILE_LINE_SIZE: f32 = 16.0;
const FILE_LINE_HEIGHT: f32 = 20.0;
const MAX_FILE_LINES: usize = 3;

const SAMPLE_BULLETS: [&str; 3] = [
    "\u{2022} This is a converted slide from your presentation",
    "\u{2022} The actual content from your original file would appear here",
    "\u{2022} A full implementation would extract real presentation content",
];

static SLIDE_PART: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ppt/slides/slide\d+\.xml$").expect("static regex"));

pub struct PresentationRenderer;

impl Renderer for PresentationRenderer {
    fn name(&self) -> &str {
        "Presentation"
    }

    fn formats(&self) -> &[SourceFormat] {
        &[SourceFormat::Presentation]
    }

    fn render(&self, source: &SourceFile, options: &ConversionOptions) -> Result<PdfArtifact> {
        log::info!("Rendering presentation placeholder: {}", source.name());
        let slides = slide_count(source.bytes());
        let date = Local::now().format("%Y-%m-%d").to_string();
        render_placeholder(source.name(), slides, &date, options)
    }
}

/// Number of `ppt/slides/slideN.xml` parts, or `None` when the bytes are
/// not a readable OOXML archive (legacy `.ppt` included).
pub fn slide_count(bytes: &[u8]) -> Option<usize> {
    match ZipReader::open(bytes) {
        Ok(zip) => Some(zip.names().iter().filter(|n| SLIDE_PART.is_match(n)).count()),
        Err(e) => {
            log::debug!("Slide count unavailable: {}", e);
            None
        }
    }
}

fn mm(v: f32) -> f32 {
    v * PT_PER_MM
}

pub fn render_placeholder(
    file_name: &str,
    slides: Option<usize>,
    date: &str,
    options: &ConversionOptions,
) -> Result<PdfArtifact> {
    let target = options.render_target();
    let (width, height) = (target.width, target.height);
    let left = target.margin;
    let mut pdf = PdfWriter::new(&format!("Converted Presentation: {}", file_name));

    // Title page.
    pdf.begin_page(width, height);
    pdf.fill_rect(0.0, 0.0, width, height, ACCENT)?;
    pdf.text_centered(
        width / 2.0,
        mm(60.0),
        "Converted Presentation",
        PdfFont::Bold,
        24.0,
        Rgb8::WHITE,
    )?;
    let file_lines = original_file_lines(file_name, width - 2.0 * left);
    let mut baseline = mm(90.0);
    for line in &file_lines {
        pdf.text_centered(width / 2.0, baseline, line, PdfFont::Regular, FILE_LINE_SIZE, Rgb8::WHITE)?;
        baseline += FILE_LINE_HEIGHT;
    }
    if let Some(n) = slides {
        let label = if n == 1 { "slide" } else { "slides" };
        pdf.text_centered(
            width / 2.0,
            baseline - FILE_LINE_HEIGHT + mm(15.0),
            &format!("{} {} detected", n, label),
            PdfFont::Regular,
            14.0,
            Rgb8::WHITE,
        )?;
    }

    // Sample content page.
    slide_header(&mut pdf, (width, height), left, "Sample Slide")?;
    for (i, bullet) in SAMPLE_BULLETS.iter().enumerate() {
        pdf.text(left, mm(50.0 + 20.0 * i as f32), bullet, PdfFont::Regular, 12.0, Rgb8::BLACK)?;
    }

    // Closing page.
    slide_header(&mut pdf, (width, height), left, "Thank You")?;
    pdf.text(
        left,
        mm(50.0),
        "Your presentation has been converted to PDF format",
        PdfFont::Regular,
        12.0,
        Rgb8::BLACK,
    )?;
    pdf.text(
        left,
        mm(80.0),
        &format!("Conversion Date: {}", date),
        PdfFont::Regular,
        12.0,
        Rgb8::BLACK,
    )?;

    if options.number_pages {
        pdf.number_pages(target.margin)?;
    }
    pdf.finish()
}

/// The title page's "Original file:" line, wrapped to `max_width` points.
/// Past [`MAX_FILE_LINES`] the last kept line ends in an ellipsis.
fn original_file_lines(file_name: &str, max_width: f32) -> Vec<String> {
    let mut lines = wrap_text(
        &format!("Original file: {}", file_name),
        max_width,
        PdfFont::Regular,
        FILE_LINE_SIZE,
    );
    if lines.len() > MAX_FILE_LINES {
        lines.truncate(MAX_FILE_LINES);
        if let Some(last) = lines.last_mut() {
            let mut kept = last.trim_end().to_string();
            while !kept.is_empty()
                && text_width(&format!("{}\u{2026}", kept), PdfFont::Regular, FILE_LINE_SIZE) > max_width
            {
                kept.pop();
            }
            *last = format!("{}\u{2026}", kept);
        }
    }
    lines
}

/// New page with the grey header bar and an accent title.
fn slide_header(pdf: &mut PdfWriter, (width, height): (f32, f32), left: f32, title: &str) -> Result<()> {
    pdf.begin_page(width, height);
    pdf.fill_rect(0.0, 0.0, width, mm(30.0), HEADER_BAR)?;
    pdf.text(left, mm(20.0), title, PdfFont::Bold, 16.0, ACCENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use convert_output_pdf::metrics::text_width;
    use convert_utils::archive::ZipBuilder;

    #[test]
    fn test_slide_count() {
        let mut zip = ZipBuilder::new();
        for part in [
            "ppt/presentation.xml",
            "ppt/slides/slide1.xml",
            "ppt/slides/slide2.xml",
            "ppt/slides/_rels/slide1.xml.rels",
            "ppt/slideLayouts/slideLayout1.xml",
        ] {
            zip.add_file(part, b"<x/>").unwrap();
        }
        assert_eq!(slide_count(&zip.finish().unwrap()), Some(2));
        assert_eq!(slide_count(b"legacy ppt bytes"), None);
    }

    #[test]
    fn test_always_three_pages() {
        for slides in [None, Some(0), Some(12)] {
            let artifact =
                render_placeholder("deck.pptx", slides, "2024-01-01", &ConversionOptions::default())
                    .unwrap();
            assert_eq!(artifact.page_count(), Some(3));
        }
    }

    #[test]
    fn test_long_file_name_is_wrapped() {
        let name = format!("{}.pptx", "q".repeat(40));
        let max_width = 300.0;
        let lines = original_file_lines(&name, max_width);
        assert!(lines.len() > 1 && lines.len() <= MAX_FILE_LINES, "{lines:?}");
        for line in &lines {
            assert!(text_width(line, PdfFont::Regular, FILE_LINE_SIZE) <= max_width, "{line}");
        }
        assert_eq!(lines[0], "Original file:");
        assert_eq!(lines[1..].concat(), name);
    }

    #[test]
    fn test_very_long_file_name_is_capped() {
        let name = format!("{}.pptx", "quarterly_board_review_final_v2_".repeat(8));
        let max_width = 515.0;
        let lines = original_file_lines(&name, max_width);
        assert_eq!(lines.len(), MAX_FILE_LINES);
        for line in &lines {
            assert!(text_width(line, PdfFont::Regular, FILE_LINE_SIZE) <= max_width, "{line}");
        }
        let last = lines.last().unwrap();
        assert!(last.ends_with('\u{2026}'), "{last}");
        let shown = lines[1..].concat();
        assert!(name.starts_with(shown.trim_end_matches('\u{2026}')), "{shown}");

        let artifact =
            render_placeholder(&name, Some(4), "2024-01-01", &ConversionOptions::default()).unwrap();
        assert_eq!(artifact.page_count(), Some(3));
    }

    #[test]
    fn test_short_file_name_is_one_line() {
        assert_eq!(original_file_lines("deck.pptx", 515.0), vec!["Original file: deck.pptx"]);
    }

    #[test]
    fn test_renderer_accepts_any_bytes() {
        let source = SourceFile::new("deck.ppt", None, vec![1, 2, 3]);
        let artifact = PresentationRenderer
            .render(&source, &ConversionOptions::default())
            .unwrap();
        assert_eq!(artifact.page_count(), Some(3));
    }
}
