//! PDF page writer shared by every renderer.
//!
//! Uses printpdf 0.8 with embedded DejaVu Sans faces and Op-based page
//! construction. Callers position everything in points from the top-left
//! corner of the page; the writer flips to PDF's bottom-left origin.

pub mod fonts;
pub mod metrics;

use std::collections::HashMap;

use printpdf::*;

use convert_core::artifact::PdfArtifact;
use convert_core::error::{ConvertError, Result};

pub use fonts::PdfFont;

const MM_PER_PT: f32 = 25.4 / 72.0;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

impl Rgb8 {
    pub const BLACK: Rgb8 = Rgb8(0, 0, 0);
    pub const WHITE: Rgb8 = Rgb8(255, 255, 255);
    pub const GRAY: Rgb8 = Rgb8(100, 100, 100);

    fn color(self) -> Color {
        Color::Rgb(Rgb {
            r: self.0 as f32 / 255.0,
            g: self.1 as f32 / 255.0,
            b: self.2 as f32 / 255.0,
            icc_profile: None,
        })
    }
}

struct PageState {
    width: f32,
    height: f32,
    ops: Vec<Op>,
}

impl PageState {
    fn point(&self, x: f32, y_top: f32) -> Point {
        Point {
            x: Pt(x),
            y: Pt(self.height - y_top),
        }
    }
}

/// Builds a PDF page by page. Pages are kept in insertion order.
pub struct PdfWriter {
    doc: PdfDocument,
    pages: Vec<PageState>,
    fonts: HashMap<PdfFont, FontId>,
}

impl PdfWriter {
    pub fn new(title: &str) -> Self {
        Self {
            doc: PdfDocument::new(title),
            pages: Vec::new(),
            fonts: HashMap::new(),
        }
    }

    /// Embed `font` on first use.
    fn font_id(&mut self, font: PdfFont) -> Result<FontId> {
        if let Some(id) = self.fonts.get(&font) {
            return Ok(id.clone());
        }
        let mut warnings = Vec::new();
        let parsed = ParsedFont::from_bytes(font.bytes(), 0, &mut warnings)
            .ok_or_else(|| ConvertError::Render(format!("Cannot load font {}", font.name())))?;
        let id = self.doc.add_font(&parsed);
        log::debug!("Embedded font {}", font.name());
        self.fonts.insert(font, id.clone());
        Ok(id)
    }

    /// Start a new page; subsequent drawing goes to it.
    pub fn begin_page(&mut self, width: f32, height: f32) {
        self.pages.push(PageState {
            width,
            height,
            ops: Vec::new(),
        });
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Size of the page currently being drawn.
    pub fn page_size(&self) -> Option<(f32, f32)> {
        self.pages.last().map(|p| (p.width, p.height))
    }

    fn current(&mut self) -> Result<&mut PageState> {
        self.pages
            .last_mut()
            .ok_or_else(|| ConvertError::Render("no page has been started".to_string()))
    }

    pub fn fill_rect(&mut self, x: f32, y_top: f32, w: f32, h: f32, color: Rgb8) -> Result<()> {
        let page = self.current()?;
        let ring = rect_ring(page, x, y_top, w, h);
        page.ops.push(Op::SaveGraphicsState);
        page.ops.push(Op::SetFillColor { col: color.color() });
        page.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![ring],
                mode: PaintMode::Fill,
                winding_order: WindingOrder::NonZero,
            },
        });
        page.ops.push(Op::RestoreGraphicsState);
        Ok(())
    }

    pub fn stroke_rect(
        &mut self,
        x: f32,
        y_top: f32,
        w: f32,
        h: f32,
        color: Rgb8,
        thickness: f32,
    ) -> Result<()> {
        let page = self.current()?;
        let ring = rect_ring(page, x, y_top, w, h);
        page.ops.push(Op::SaveGraphicsState);
        page.ops.push(Op::SetOutlineColor { col: color.color() });
        page.ops.push(Op::SetOutlineThickness { pt: Pt(thickness) });
        page.ops.push(Op::DrawPolygon {
            polygon: Polygon {
                rings: vec![ring],
                mode: PaintMode::Stroke,
                winding_order: WindingOrder::NonZero,
            },
        });
        page.ops.push(Op::RestoreGraphicsState);
        Ok(())
    }

    /// Draw one line of text with its baseline `baseline` points below the
    /// top of the page.
    pub fn text(
        &mut self,
        x: f32,
        baseline: f32,
        text: &str,
        font: PdfFont,
        size: f32,
        color: Rgb8,
    ) -> Result<()> {
        self.current()?;
        let font = self.font_id(font)?;
        let page = self.current()?;
        let pos = page.point(x, baseline);
        page.ops.push(Op::SaveGraphicsState);
        page.ops.push(Op::SetFillColor { col: color.color() });
        page.ops.push(Op::StartTextSection);
        page.ops.push(Op::SetFontSize {
            size: Pt(size),
            font: font.clone(),
        });
        page.ops.push(Op::SetTextCursor { pos });
        page.ops.push(Op::WriteText {
            items: vec![TextItem::Text(text.to_string())],
            font,
        });
        page.ops.push(Op::EndTextSection);
        page.ops.push(Op::RestoreGraphicsState);
        Ok(())
    }

    /// Text horizontally centered on `center_x`.
    pub fn text_centered(
        &mut self,
        center_x: f32,
        baseline: f32,
        text: &str,
        font: PdfFont,
        size: f32,
        color: Rgb8,
    ) -> Result<()> {
        let width = metrics::text_width(text, font, size);
        self.text(center_x - width / 2.0, baseline, text, font, size, color)
    }

    /// Embed an encoded bitmap (PNG, JPEG or GIF) stretched to `w` x `h`
    /// points with its top-left corner at (`x`, `y_top`).
    pub fn image(&mut self, data: &[u8], x: f32, y_top: f32, w: f32, h: f32) -> Result<()> {
        let mut warnings = Vec::new();
        let image = RawImage::decode_from_bytes(data, &mut warnings)
            .map_err(|e| ConvertError::Render(format!("Image embed failed: {}", e)))?;
        let (px_w, px_h) = (image.width.max(1) as f32, image.height.max(1) as f32);
        let image_id = self.doc.add_image(&image);

        let page = self.current()?;
        let bottom = page.height - y_top - h;
        // At 72 dpi one image pixel is one point before scaling.
        page.ops.push(Op::UseXobject {
            id: image_id,
            transform: XObjectTransform {
                translate_x: Some(Pt(x)),
                translate_y: Some(Pt(bottom)),
                scale_x: Some(w / px_w),
                scale_y: Some(h / px_h),
                dpi: Some(72.0),
                ..Default::default()
            },
        });
        Ok(())
    }

    /// Stamp "Page i of N" at the bottom center of every page. Does nothing
    /// for single-page documents.
    pub fn number_pages(&mut self, margin: f32) -> Result<()> {
        let total = self.pages.len();
        if total <= 1 {
            return Ok(());
        }
        let size = 9.0;
        let font = self.font_id(PdfFont::Regular)?;
        let baseline_from_bottom = (margin / 2.0).max(size);
        for i in 0..total {
            let label = format!("Page {} of {}", i + 1, total);
            let width = metrics::text_width(&label, PdfFont::Regular, size);
            let page = &mut self.pages[i];
            let pos = Point {
                x: Pt((page.width - width) / 2.0),
                y: Pt(baseline_from_bottom),
            };
            page.ops.push(Op::SaveGraphicsState);
            page.ops.push(Op::SetFillColor {
                col: Rgb8(128, 128, 128).color(),
            });
            page.ops.push(Op::StartTextSection);
            page.ops.push(Op::SetFontSize {
                size: Pt(size),
                font: font.clone(),
            });
            page.ops.push(Op::SetTextCursor { pos });
            page.ops.push(Op::WriteText {
                items: vec![TextItem::Text(label)],
                font: font.clone(),
            });
            page.ops.push(Op::EndTextSection);
            page.ops.push(Op::RestoreGraphicsState);
        }
        Ok(())
    }

    /// Serialize the document. A document without pages is a render failure,
    /// never an empty artifact.
    pub fn finish(self) -> Result<PdfArtifact> {
        if self.pages.is_empty() {
            return Err(ConvertError::Render("document has no pages".to_string()));
        }
        let page_count = self.pages.len();
        let pages: Vec<PdfPage> = self
            .pages
            .into_iter()
            .map(|p| PdfPage::new(Mm(p.width * MM_PER_PT), Mm(p.height * MM_PER_PT), p.ops))
            .collect();

        let mut warnings = Vec::new();
        let mut doc = self.doc;
        let bytes = doc
            .with_pages(pages)
            .save(&PdfSaveOptions::default(), &mut warnings);
        log::debug!("Serialized {} pages ({} bytes)", page_count, bytes.len());
        Ok(PdfArtifact::new(bytes, page_count))
    }
}

fn rect_ring(page: &PageState, x: f32, y_top: f32, w: f32, h: f32) -> PolygonRing {
    let corners = [
        (x, y_top),
        (x + w, y_top),
        (x + w, y_top + h),
        (x, y_top + h),
    ];
    PolygonRing {
        points: corners
            .iter()
            .map(|&(cx, cy)| LinePoint {
                p: page.point(cx, cy),
                bezier: false,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_fixture(w: u32, h: u32) -> Vec<u8> {
        let img = ::image::RgbImage::from_pixel(w, h, ::image::Rgb([200, 30, 30]));
        let mut buf = Vec::new();
        ::image::DynamicImage::ImageRgb8(img)
            .write_to(&mut std::io::Cursor::new(&mut buf), ::image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn test_empty_document_is_error() {
        let writer = PdfWriter::new("empty");
        assert!(matches!(writer.finish(), Err(ConvertError::Render(_))));
    }

    #[test]
    fn test_drawing_without_page_is_error() {
        let mut writer = PdfWriter::new("nopage");
        assert!(writer
            .text(10.0, 10.0, "x", PdfFont::Regular, 12.0, Rgb8::BLACK)
            .is_err());
    }

    #[test]
    fn test_text_pages() {
        let mut writer = PdfWriter::new("Test");
        for i in 0..3 {
            writer.begin_page(595.28, 841.89);
            writer
                .text(40.0, 60.0, &format!("Page body {}", i), PdfFont::Regular, 12.0, Rgb8::BLACK)
                .unwrap();
        }
        writer.fill_rect(0.0, 0.0, 595.28, 30.0, Rgb8(240, 240, 240)).unwrap();
        writer.number_pages(40.0).unwrap();
        let artifact = writer.finish().unwrap();
        assert_eq!(artifact.page_count(), Some(3));
        assert_eq!(&artifact.bytes()[..5], b"%PDF-");
    }

    /// Every string shown with Tj/TJ on the first page.
    fn shown_strings(pdf: &[u8]) -> Vec<Vec<u8>> {
        let doc = lopdf::Document::load_mem(pdf).unwrap();
        let page_id = *doc.get_pages().values().next().unwrap();
        let content = doc.get_page_content(page_id).unwrap();
        let ops = lopdf::content::Content::decode(&content).unwrap().operations;
        let mut shown = Vec::new();
        for op in ops {
            if op.operator != "Tj" && op.operator != "TJ" {
                continue;
            }
            for operand in op.operands {
                match operand {
                    lopdf::Object::String(bytes, _) => shown.push(bytes),
                    lopdf::Object::Array(items) => {
                        for item in items {
                            if let lopdf::Object::String(bytes, _) = item {
                                shown.push(bytes);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        shown
    }

    /// Glyph id to character, from the `bfchar` entries of the embedded
    /// font's ToUnicode CMap.
    fn to_unicode(pdf: &[u8]) -> std::collections::HashMap<u16, char> {
        let doc = lopdf::Document::load_mem(pdf).unwrap();
        let cmap_id = doc
            .objects
            .values()
            .find_map(|object| {
                let dict = match object {
                    lopdf::Object::Dictionary(dict) => dict,
                    lopdf::Object::Stream(stream) => &stream.dict,
                    _ => return None,
                };
                dict.get(b"ToUnicode").and_then(|o| o.as_reference()).ok()
            })
            .expect("font has a ToUnicode CMap");
        let stream = doc.get_object(cmap_id).unwrap().as_stream().unwrap();
        let content = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let text = String::from_utf8_lossy(&content);

        let mut map = std::collections::HashMap::new();
        for section in text.split("beginbfchar").skip(1) {
            let body = section.split("endbfchar").next().unwrap_or("");
            let hex: Vec<&str> = body
                .split('<')
                .skip(1)
                .filter_map(|part| part.split('>').next())
                .collect();
            for pair in hex.chunks(2) {
                let gid = u16::from_str_radix(pair[0], 16).unwrap();
                let units: Vec<u16> = (0..pair[1].len())
                    .step_by(4)
                    .map(|i| u16::from_str_radix(&pair[1][i..i + 4], 16).unwrap())
                    .collect();
                let ch = char::decode_utf16(units).next().unwrap().unwrap();
                map.insert(gid, ch);
            }
        }
        map
    }

    #[test]
    fn test_non_ascii_text_is_encoded_as_glyphs() {
        let mut writer = PdfWriter::new("Unicode");
        writer.begin_page(595.28, 841.89);
        writer
            .text(40.0, 60.0, "Caf\u{e9} \u{2022}", PdfFont::Regular, 12.0, Rgb8::BLACK)
            .unwrap();
        let artifact = writer.finish().unwrap();

        let shown = shown_strings(artifact.bytes()).concat();
        // Six characters, one two-byte glyph id each.
        assert_eq!(shown.len(), 12, "{shown:02X?}");
        assert!(!shown.windows(2).any(|w| w == [0xC3, 0xA9]), "{shown:02X?}");
        let cmap = to_unicode(artifact.bytes());
        let decoded: String = shown
            .chunks(2)
            .map(|gid| cmap[&u16::from_be_bytes([gid[0], gid[1]])])
            .collect();
        assert_eq!(decoded, "Caf\u{e9} \u{2022}");
    }

    #[test]
    fn test_fonts_embedded_once() {
        let mut writer = PdfWriter::new("Fonts");
        writer.begin_page(595.28, 841.89);
        for font in [PdfFont::Regular, PdfFont::Bold, PdfFont::Regular, PdfFont::Bold] {
            writer.text(40.0, 60.0, "x", font, 12.0, Rgb8::BLACK).unwrap();
        }
        assert_eq!(writer.fonts.len(), 2);
    }

    #[test]
    fn test_embed_png() {
        let mut writer = PdfWriter::new("Image");
        writer.begin_page(595.28, 841.89);
        writer.image(&png_fixture(40, 20), 40.0, 40.0, 200.0, 100.0).unwrap();
        let artifact = writer.finish().unwrap();
        assert_eq!(artifact.page_count(), Some(1));
        assert!(artifact.len() > 100);
    }

    #[test]
    fn test_embed_garbage_is_render_error() {
        let mut writer = PdfWriter::new("Bad");
        writer.begin_page(595.28, 841.89);
        let err = writer.image(b"not an image", 0.0, 0.0, 10.0, 10.0).unwrap_err();
        assert!(matches!(err, ConvertError::Render(_)));
    }
}
