//! Block layout: turns markup into a display list of positioned text runs and
//! filled rectangles at a fixed content width.
//!
//! Coordinates are CSS pixels from the top-left of the content box. Layout
//! is pure: the same blocks, stylesheet and width always give the same list.

use crate::fonts::{FaceId, FontSet};
use crate::markup::{Align, Block, Span, TableCell};
use crate::stylesheet::{FontFamily, Stylesheet, TextStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum DrawItem {
    /// `y` is the top of the glyph box (baseline minus ascent).
    Text {
        x: f32,
        y: f32,
        size: f32,
        face: FaceId,
        color: [u8; 3],
        text: String,
    },
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: [u8; 3],
    },
}

impl DrawItem {
    /// Vertical extent `(top, bottom)` of the item.
    pub fn vertical_span(&self) -> (f32, f32) {
        match self {
            DrawItem::Text { y, size, .. } => (*y, *y + *size * 1.3),
            DrawItem::Rect { y, h, .. } => (*y, *y + *h),
        }
    }
}

/// Laid-out content, ready for rasterization.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
    pub width: f32,
    pub height: f32,
    pub items: Vec<DrawItem>,
}

/// Lay out `blocks` at `width` CSS pixels.
pub fn layout(blocks: &[Block], sheet: &Stylesheet, width: f32, fonts: &FontSet) -> DisplayList {
    let mut ctx = Layout {
        fonts,
        sheet,
        items: Vec::new(),
        y: 0.0,
        pending_margin: 0.0,
        marker: None,
        overrides: Overrides::default(),
        list_depth: 0,
    };
    ctx.blocks(blocks, 0.0, width);
    DisplayList {
        width,
        height: ctx.y.ceil().max(1.0),
        items: ctx.items,
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Overrides {
    italic: bool,
    color: Option<[u8; 3]>,
}

struct Word {
    text: String,
    face: FaceId,
    size: f32,
    color: [u8; 3],
    underline: bool,
    strike: bool,
    space_before: bool,
    width: f32,
    space_width: f32,
}

enum Token {
    Word(Word),
    Break,
}

struct Layout<'a> {
    fonts: &'a FontSet,
    sheet: &'a Stylesheet,
    items: Vec<DrawItem>,
    y: f32,
    pending_margin: f32,
    /// List marker waiting for the first line of its item: (text, right edge).
    marker: Option<(String, f32)>,
    overrides: Overrides,
    list_depth: usize,
}

impl Layout<'_> {
    /// Collapse the previous block's bottom margin with this block's top.
    fn margin(&mut self, before: f32) {
        self.y += self.pending_margin.max(before);
        self.pending_margin = 0.0;
    }

    fn blocks(&mut self, blocks: &[Block], x: f32, width: f32) {
        for block in blocks {
            self.block(block, x, width);
        }
    }

    fn block(&mut self, block: &Block, x: f32, width: f32) {
        let sheet = self.sheet;
        match block {
            Block::Heading { level, spans, align } => {
                let style = *sheet.heading(*level);
                self.text_block(spans, &style, align.unwrap_or(Align::Start), x, width);
            }
            Block::Title { spans, align } => {
                let style = sheet.title;
                self.text_block(spans, &style, align.unwrap_or(Align::Start), x, width);
            }
            Block::Subtitle { spans, align } => {
                let style = sheet.subtitle;
                self.text_block(spans, &style, align.unwrap_or(Align::Start), x, width);
            }
            Block::Paragraph { spans, align } => {
                let mut style = sheet.body;
                let default_align = if self.list_depth > 0 {
                    style.space_after = style.size * 0.25;
                    Align::Start
                } else {
                    sheet.paragraph_align
                };
                self.text_block(spans, &style, align.unwrap_or(default_align), x, width);
            }
            Block::Quote { intense, blocks } => self.quote(*intense, blocks, x, width),
            Block::List { ordered, items } => self.list(*ordered, items, x, width),
            Block::Table { rows } => self.table(rows, x, width),
            Block::Preformatted { text } => self.preformatted(text, x, width),
            Block::Rule => {
                let gap = sheet.body.size * 0.5;
                self.margin(gap);
                self.items.push(DrawItem::Rect {
                    x,
                    y: self.y,
                    w: width,
                    h: 1.0,
                    color: sheet.rule_color,
                });
                self.y += 1.0;
                self.pending_margin = gap;
            }
        }
    }

    fn text_block(&mut self, spans: &[Span], style: &TextStyle, align: Align, x: f32, width: f32) {
        self.margin(style.space_before);
        let tokens = self.tokenize(spans, style);
        self.flow(tokens, style, align, x, width);
        self.pending_margin = style.space_after;
    }

    fn quote(&mut self, intense: bool, blocks: &[Block], x: f32, width: f32) {
        let qs = if intense {
            self.sheet.intense_quote
        } else {
            self.sheet.quote
        };
        self.margin(self.sheet.body.size * 0.5);
        let start = self.items.len();
        let top = self.y;
        let pad = if qs.background.is_some() { 8.0 } else { 2.0 };

        let saved = self.overrides;
        self.overrides = Overrides {
            italic: saved.italic || qs.italic,
            color: Some(qs.text_color),
        };
        self.y += pad;
        let inner_x = x + qs.indent;
        let inner_w = (width - qs.indent - pad).max(1.0);
        self.blocks(blocks, inner_x, inner_w);
        self.overrides = saved;

        let bottom = self.y + pad;
        let mut underlay = Vec::new();
        if let Some(bg) = qs.background {
            underlay.push(DrawItem::Rect {
                x,
                y: top,
                w: width,
                h: bottom - top,
                color: bg,
            });
        }
        underlay.push(DrawItem::Rect {
            x,
            y: top,
            w: qs.bar_width,
            h: bottom - top,
            color: qs.bar_color,
        });
        let tail = self.items.split_off(start);
        self.items.extend(underlay);
        self.items.extend(tail);
        self.y = bottom;
        self.pending_margin = self.pending_margin.max(self.sheet.body.size * 0.5);
    }

    fn list(&mut self, ordered: bool, items: &[Vec<Block>], x: f32, width: f32) {
        let indent = self.sheet.list_indent;
        let gap = self.sheet.body.size * 0.4;
        self.list_depth += 1;
        for (i, item) in items.iter().enumerate() {
            let marker = if ordered {
                format!("{}.", i + 1)
            } else {
                "\u{2022}".to_string()
            };
            self.marker = Some((marker, x + indent - gap));
            self.blocks(item, x + indent, (width - indent).max(1.0));
            self.marker = None;
        }
        self.list_depth -= 1;
        if self.list_depth == 0 {
            self.pending_margin = self.pending_margin.max(self.sheet.body.space_after);
        }
    }

    fn table(&mut self, rows: &[Vec<TableCell>], x: f32, width: f32) {
        let cols = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        if cols == 0 {
            return;
        }
        let ts = self.sheet.table;
        let body = self.sheet.body;
        self.margin(body.size * 0.5);

        let col_w = width / cols as f32;
        let pad = ts.cell_padding;
        let size = body.size * ts.font_scale;
        let min_row = size * 1.3 + 2.0 * pad;

        for row in rows {
            let top = self.y;
            let start = self.items.len();
            let mut bottom = top + min_row;
            for (c, cell) in row.iter().enumerate() {
                let style = TextStyle {
                    size,
                    bold: cell.header,
                    line_height: 1.3,
                    space_before: 0.0,
                    space_after: 0.0,
                    ..body
                };
                let align = if cell.header { Align::Center } else { Align::Start };
                self.y = top + pad;
                let tokens = self.tokenize(&cell.spans, &style);
                self.flow(
                    tokens,
                    &style,
                    align,
                    x + c as f32 * col_w + pad,
                    (col_w - 2.0 * pad).max(1.0),
                );
                bottom = bottom.max(self.y + pad);
            }
            let row_h = bottom - top;

            if row.iter().any(|c| c.header) {
                self.items.insert(
                    start,
                    DrawItem::Rect {
                        x,
                        y: top,
                        w: col_w * cols as f32,
                        h: row_h,
                        color: ts.header_fill,
                    },
                );
            }
            for c in 0..cols {
                self.outline(x + c as f32 * col_w, top, col_w, row_h, ts.border_width, ts.border_color);
            }
            self.y = bottom;
        }
        self.pending_margin = body.space_after;
    }

    fn preformatted(&mut self, text: &str, x: f32, width: f32) {
        let style = self.sheet.mono;
        self.margin(style.size * 0.5);
        let start = self.items.len();
        let top = self.y;
        let pad = 8.0;
        self.y += pad;

        let face = FaceId::new(FontFamily::Mono, false, false);
        let metrics = self.fonts.line_metrics(face, style.size);
        let line_h = style.size * style.line_height;
        let color = self.overrides.color.unwrap_or(style.color);
        for line in text.split('\n') {
            let line = line.trim_end_matches('\r').replace('\t', "    ");
            if !line.trim().is_empty() {
                let content_h = metrics.ascent - metrics.descent;
                self.items.push(DrawItem::Text {
                    x: x + pad,
                    y: self.y + (line_h - content_h) / 2.0,
                    size: style.size,
                    face,
                    color,
                    text: line,
                });
            }
            self.y += line_h;
        }
        self.y += pad;
        self.items.insert(
            start,
            DrawItem::Rect {
                x,
                y: top,
                w: width,
                h: self.y - top,
                color: self.sheet.code_background,
            },
        );
        self.pending_margin = style.space_after;
    }

    fn outline(&mut self, x: f32, y: f32, w: f32, h: f32, t: f32, color: [u8; 3]) {
        let edges = [
            (x, y, w, t),
            (x, y + h - t, w, t),
            (x, y, t, h),
            (x + w - t, y, t, h),
        ];
        for (ex, ey, ew, eh) in edges {
            self.items.push(DrawItem::Rect {
                x: ex,
                y: ey,
                w: ew,
                h: eh,
                color,
            });
        }
    }

    fn tokenize(&self, spans: &[Span], style: &TextStyle) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut space = false;
        for span in spans {
            if span.is_break() {
                tokens.push(Token::Break);
                space = false;
                continue;
            }
            let family = if span.style.code {
                FontFamily::Mono
            } else {
                style.family
            };
            let face = FaceId::new(
                family,
                style.bold || span.style.bold,
                style.italic || span.style.italic || self.overrides.italic,
            );
            let size = if span.style.code {
                style.size * 0.9
            } else {
                style.size
            };
            let color = self.overrides.color.unwrap_or(style.color);
            let space_width = self.fonts.measure(face, size, " ");

            let mut word = String::new();
            let push = |word: &mut String, space: &mut bool, tokens: &mut Vec<Token>| {
                tokens.push(Token::Word(Word {
                    width: self.fonts.measure(face, size, word),
                    text: std::mem::take(word),
                    face,
                    size,
                    color,
                    underline: span.style.underline,
                    strike: span.style.strike,
                    space_before: *space,
                    space_width,
                }));
                *space = false;
            };
            for c in span.text.chars() {
                if c.is_whitespace() {
                    if !word.is_empty() {
                        push(&mut word, &mut space, &mut tokens);
                    }
                    space = true;
                } else {
                    word.push(c);
                }
            }
            if !word.is_empty() {
                push(&mut word, &mut space, &mut tokens);
            }
        }
        tokens
    }

    /// Greedy line breaking followed by per-line alignment.
    fn flow(&mut self, tokens: Vec<Token>, style: &TextStyle, align: Align, x: f32, width: f32) {
        let mut line: Vec<(f32, Word)> = Vec::new();
        let mut line_w = 0.0;
        for token in tokens {
            match token {
                Token::Break => {
                    let done = std::mem::take(&mut line);
                    self.emit_line(done, true, style, align, x, width);
                    line_w = 0.0;
                }
                Token::Word(word) => {
                    let mut gap = if line.is_empty() || !word.space_before {
                        0.0
                    } else {
                        word.space_width
                    };
                    if !line.is_empty() && line_w + gap + word.width > width {
                        let done = std::mem::take(&mut line);
                        self.emit_line(done, false, style, align, x, width);
                        line_w = 0.0;
                        gap = 0.0;
                    }
                    line_w += gap + word.width;
                    line.push((gap, word));
                }
            }
        }
        if !line.is_empty() {
            self.emit_line(line, true, style, align, x, width);
        }
    }

    fn emit_line(
        &mut self,
        words: Vec<(f32, Word)>,
        last: bool,
        style: &TextStyle,
        align: Align,
        x: f32,
        width: f32,
    ) {
        let size = words.iter().map(|(_, w)| w.size).fold(style.size, f32::max);
        let line_h = size * style.line_height;
        if words.is_empty() {
            self.y += line_h;
            return;
        }

        let mut ascent: f32 = 0.0;
        let mut descent: f32 = 0.0;
        for (_, w) in &words {
            let m = self.fonts.line_metrics(w.face, w.size);
            ascent = ascent.max(m.ascent);
            descent = descent.min(m.descent);
        }
        let baseline = self.y + (line_h - (ascent - descent)) / 2.0 + ascent;

        let natural: f32 = words.iter().map(|(gap, w)| gap + w.width).sum();
        let free = (width - natural).max(0.0);
        let gaps = words.iter().filter(|(gap, _)| *gap > 0.0).count();
        let (mut cx, extra) = match align {
            Align::Start => (x, 0.0),
            Align::Center => (x + free / 2.0, 0.0),
            Align::End => (x + free, 0.0),
            Align::Justify if !last && gaps > 0 => (x, free / gaps as f32),
            Align::Justify => (x, 0.0),
        };

        if let Some((marker, right)) = self.marker.take() {
            let first = &words[0].1;
            let face = FaceId::new(first.face.family, false, false);
            let mw = self.fonts.measure(face, first.size, &marker);
            let m = self.fonts.line_metrics(face, first.size);
            self.items.push(DrawItem::Text {
                x: right - mw,
                y: baseline - m.ascent,
                size: first.size,
                face,
                color: first.color,
                text: marker,
            });
        }

        for (gap, word) in words {
            if gap > 0.0 {
                cx += gap + extra;
            }
            let m = self.fonts.line_metrics(word.face, word.size);
            let thickness = (word.size / 16.0).max(1.0);
            if word.underline {
                self.items.push(DrawItem::Rect {
                    x: cx,
                    y: baseline + word.size * 0.1,
                    w: word.width,
                    h: thickness,
                    color: word.color,
                });
            }
            if word.strike {
                self.items.push(DrawItem::Rect {
                    x: cx,
                    y: baseline - word.size * 0.3,
                    w: word.width,
                    h: thickness,
                    color: word.color,
                });
            }
            let advance = word.width;
            self.items.push(DrawItem::Text {
                x: cx,
                y: baseline - m.ascent,
                size: word.size,
                face: word.face,
                color: word.color,
                text: word.text,
            });
            cx += advance;
        }
        self.y += line_h;
    }
}
