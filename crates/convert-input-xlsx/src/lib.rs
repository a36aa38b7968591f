//! Spreadsheet renderer.
//!
//! Cell content is not extracted. The output is a one-page notice naming
//! the source workbook: a heading, a grid table explaining the limitation,
//! the original file name and the conversion date. Worksheet names are
//! listed when the input is a readable `.xlsx` archive.

use chrono::Local;

use convert_core::artifact::PdfArtifact;
use convert_core::error::Result;
use convert_core::options::ConversionOptions;
use convert_core::plugin::Renderer;
use convert_core::source::{SourceFile, SourceFormat};
use convert_output_pdf::metrics::wrap_text;
use convert_output_pdf::{PdfFont, PdfWriter, Rgb8};
use convert_utils::archive::ZipReader;
use convert_utils::xml::collect_attribute;

const HEADING_COLOR: Rgb8 = Rgb8(0, 102, 204);
const HEADER_FILL: Rgb8 = Rgb8(79, 129, 189);
const GRID_COLOR: Rgb8 = Rgb8(200, 200, 200);
const CELL_PADDING: f32 = 6.0;

const TABLE_HEADER: &str = "This is a converted Excel document";
const TABLE_ROWS: [&str; 3] = [
    "Excel documents require further processing to extract actual data.",
    "Cell values, formulas and formatting are not reproduced in this conversion.",
    "This PDF contains a placeholder for the Excel content.",
];

pub struct SpreadsheetRenderer;

impl Renderer for SpreadsheetRenderer {
    fn name(&self) -> &str {
        "Spreadsheet"
    }

    fn formats(&self) -> &[SourceFormat] {
        &[SourceFormat::Spreadsheet]
    }

    fn render(&self, source: &SourceFile, options: &ConversionOptions) -> Result<PdfArtifact> {
        log::info!("Rendering spreadsheet placeholder: {}", source.name());
        let sheets = sheet_names(source.bytes());
        let date = Local::now().format("%Y-%m-%d").to_string();
        render_placeholder(source.name(), &sheets, &date, options)
    }
}

/// Worksheet names from `xl/workbook.xml`, in workbook order. Empty when
/// the bytes are not a readable OOXML workbook (legacy `.xls` included).
pub fn sheet_names(bytes: &[u8]) -> Vec<String> {
    let xml = ZipReader::open(bytes).and_then(|mut zip| zip.read_string("xl/workbook.xml"));
    match xml {
        Ok(xml) => collect_attribute(&xml, "sheet", "name"),
        Err(e) => {
            log::debug!("No worksheet names available: {}", e);
            Vec::new()
        }
    }
}

/// Lay out the notice page(s). Overflowing worksheet lists continue on a
/// new page.
pub fn render_placeholder(
    file_name: &str,
    sheets: &[String],
    date: &str,
    options: &ConversionOptions,
) -> Result<PdfArtifact> {
    let target = options.render_target();
    let (width, height) = (target.width, target.height);
    let left = target.margin;
    let inner = target.printable_width();
    let bottom = height - target.margin;

    let mut pdf = PdfWriter::new(&format!("Converted from Excel: {}", file_name));
    pdf.begin_page(width, height);

    let mut y = target.margin;
    for line in wrap_text(
        &format!("Converted from Excel: {}", file_name),
        inner,
        PdfFont::Bold,
        16.0,
    ) {
        y += 16.0 * 1.15;
        pdf.text(left, y, &line, PdfFont::Bold, 16.0, HEADING_COLOR)?;
    }
    y += 12.0;

    // Header row.
    let header_h = 12.0 * 1.15 + 2.0 * CELL_PADDING;
    pdf.fill_rect(left, y, inner, header_h, HEADER_FILL)?;
    pdf.stroke_rect(left, y, inner, header_h, GRID_COLOR, 0.5)?;
    pdf.text_centered(
        left + inner / 2.0,
        y + CELL_PADDING + 12.0,
        TABLE_HEADER,
        PdfFont::Bold,
        12.0,
        Rgb8::WHITE,
    )?;
    y += header_h;

    for row in TABLE_ROWS {
        let lines = wrap_text(row, inner - 2.0 * CELL_PADDING, PdfFont::Regular, 10.0);
        let row_h = lines.len() as f32 * 10.0 * 1.15 + 2.0 * CELL_PADDING;
        pdf.stroke_rect(left, y, inner, row_h, GRID_COLOR, 0.5)?;
        let mut baseline = y + CELL_PADDING + 10.0;
        for line in &lines {
            pdf.text(left + CELL_PADDING, baseline, line, PdfFont::Regular, 10.0, Rgb8::BLACK)?;
            baseline += 10.0 * 1.15;
        }
        y += row_h;
    }

    y += 14.0;
    for line in wrap_text(&format!("Original File: {}", file_name), inner, PdfFont::Regular, 10.0) {
        y += 14.0;
        pdf.text(left, y, &line, PdfFont::Regular, 10.0, Rgb8::GRAY)?;
    }
    y += 14.0;
    pdf.text(left, y, &format!("Conversion Date: {}", date), PdfFont::Regular, 10.0, Rgb8::GRAY)?;

    if !sheets.is_empty() {
        y += 24.0;
        let mut lines = vec![format!("Worksheets ({}):", sheets.len())];
        lines.extend(sheets.iter().map(|s| format!("  {}", s)));
        for line in lines {
            if y + 14.0 > bottom {
                pdf.begin_page(width, height);
                y = target.margin;
            }
            y += 14.0;
            pdf.text(left, y, &line, PdfFont::Regular, 10.0, Rgb8::GRAY)?;
        }
    }

    if options.number_pages {
        pdf.number_pages(target.margin)?;
    }
    let artifact = pdf.finish()?;
    log::info!(
        "Spreadsheet placeholder has {} page(s)",
        artifact.page_count().unwrap_or(0)
    );
    Ok(artifact)
}
