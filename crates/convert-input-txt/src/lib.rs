//! Text renderer for plain text, Markdown, CSV and RTF.
//!
//! Text is set in DejaVu Sans with a font size picked from three length
//! tiers, wrapped to the printable width and broken into pages greedily.
//! RTF is reduced to its plain text first. Page numbers are added when the
//! result spans more than one page.

pub mod layout;
pub mod rtf;

use convert_core::artifact::PdfArtifact;
use convert_core::error::Result;
use convert_core::options::ConversionOptions;
use convert_core::plugin::Renderer;
use convert_core::source::{SourceFile, SourceFormat};
use convert_output_pdf::{PdfFont, PdfWriter, Rgb8};
use convert_utils::encoding::decode_to_utf8;

use crate::layout::paginate_text;

const HEADER_COLOR: Rgb8 = Rgb8(0, 102, 204);

pub struct TextRenderer;

impl Renderer for TextRenderer {
    fn name(&self) -> &str {
        "Text"
    }

    fn formats(&self) -> &[SourceFormat] {
        &[SourceFormat::Text]
    }

    fn render(&self, source: &SourceFile, options: &ConversionOptions) -> Result<PdfArtifact> {
        log::info!("Rendering text: {}", source.name());
        let (decoded, encoding) = decode_to_utf8(source.bytes());
        log::debug!("Decoded {} as {}", source.name(), encoding);

        let is_rtf = source.extension().as_deref() == Some("rtf")
            || source.mime().is_some_and(|m| m.contains("rtf"));
        let text = if is_rtf {
            rtf::rtf_to_text(&decoded)?
        } else {
            decoded
        };

        let header = options
            .text_header
            .then(|| format!("Converted from: {}", source.name()));
        render_text(&text, header.as_deref(), source.stem(), options)
    }
}

/// Lay out and write `text`. Always produces at least one page.
pub fn render_text(
    text: &str,
    header: Option<&str>,
    title: &str,
    options: &ConversionOptions,
) -> Result<PdfArtifact> {
    let target = options.render_target();
    let text = printable(text);
    let header = header.map(printable);
    let pages = paginate_text(&text, header.as_deref(), &target);

    let mut pdf = PdfWriter::new(title);
    for page in &pages {
        pdf.begin_page(target.width, target.height);
        for line in &page.lines {
            let color = if line.header { HEADER_COLOR } else { Rgb8::BLACK };
            pdf.text(
                target.margin,
                line.baseline,
                &line.text,
                PdfFont::Regular,
                line.size,
                color,
            )?;
        }
    }
    if options.number_pages {
        pdf.number_pages(target.margin)?;
    }
    let artifact = pdf.finish()?;
    log::info!(
        "Text laid out on {} page(s) at {}pt",
        pages.len(),
        layout::font_size_for(text.chars().count())
    );
    Ok(artifact)
}

/// Blank out tabs and control characters, one for one. Line breaks stay.
fn printable(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\n' | '\r' => c,
            c if c.is_control() => ' ',
            c => c,
        })
        .collect()
}
