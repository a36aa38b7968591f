//! Streaming text layout: font tiers, wrapping and greedy page breaks.

use once_cell::sync::Lazy;
use regex::Regex;

use convert_core::geometry::RenderTarget;
use convert_output_pdf::metrics::wrap_text;
use convert_output_pdf::PdfFont;

/// Inputs longer than this many characters use the smallest tier.
pub const SMALL_TIER_ABOVE: usize = 10_000;
/// Inputs longer than this many characters use the medium tier.
pub const MEDIUM_TIER_ABOVE: usize = 5_000;

pub const LINE_HEIGHT: f32 = 1.15;
pub const PARAGRAPH_SPACING: f32 = 0.8;
pub const HEADER_SIZE: f32 = 16.0;

static BLANK_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n[ \t]*\n").expect("static regex"));

/// Body font size for a text of `chars` characters.
pub fn font_size_for(chars: usize) -> f32 {
    if chars > SMALL_TIER_ABOVE {
        8.0
    } else if chars > MEDIUM_TIER_ABOVE {
        10.0
    } else {
        12.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    /// Baseline, in points from the top of the page.
    pub baseline: f32,
    pub text: String,
    pub size: f32,
    pub header: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPage {
    pub lines: Vec<PlacedLine>,
}

/// Paragraphs separated by blank lines. Line endings are normalized and
/// whitespace-only paragraphs dropped.
pub fn paragraphs(text: &str) -> Vec<String> {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    BLANK_LINE
        .split(&text)
        .map(|p| p.trim_matches('\n').to_string())
        .filter(|p| !p.trim().is_empty())
        .collect()
}

struct Flow<'a> {
    target: &'a RenderTarget,
    pages: Vec<TextPage>,
    y: f32,
}

impl Flow<'_> {
    fn bottom(&self) -> f32 {
        self.target.height - self.target.margin
    }

    fn new_page(&mut self) {
        self.pages.push(TextPage::default());
        self.y = self.target.margin;
    }

    /// Advance by `height`, breaking the page first if it would not fit.
    /// A page that is still empty always takes the block.
    fn reserve(&mut self, height: f32) {
        let page_empty = self.pages.last().map_or(true, |p| p.lines.is_empty());
        if self.y + height > self.bottom() && !page_empty {
            self.new_page();
        }
    }

    fn line(&mut self, text: String, size: f32, header: bool) {
        let height = size * LINE_HEIGHT;
        self.reserve(height);
        let baseline = self.y + size * 0.9;
        self.y += height;
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(PlacedLine {
                baseline,
                text,
                size,
                header,
            });
        }
    }

    fn space(&mut self, height: f32) {
        if self.y + height > self.bottom() {
            self.new_page();
        } else {
            self.y += height;
        }
    }
}

/// Lay `text` out on pages of `target`. The optional header is set above
/// the first paragraph. Always yields at least one page.
pub fn paginate_text(text: &str, header: Option<&str>, target: &RenderTarget) -> Vec<TextPage> {
    let size = font_size_for(text.chars().count());
    let width = target.printable_width();
    let mut flow = Flow {
        target,
        pages: Vec::new(),
        y: target.margin,
    };
    flow.new_page();

    if let Some(header) = header {
        for line in wrap_text(header, width, PdfFont::Regular, HEADER_SIZE) {
            flow.line(line, HEADER_SIZE, true);
        }
        flow.space(HEADER_SIZE * 0.5);
    }

    for (i, para) in paragraphs(text).iter().enumerate() {
        if i > 0 {
            flow.space(size * PARAGRAPH_SPACING);
        }
        for raw in para.split('\n') {
            for line in wrap_text(raw, width, PdfFont::Regular, size) {
                flow.line(line, size, false);
            }
        }
    }

    flow.pages
}
