//! Block/inline markup tree and its construction from HTML.
//!
//! This is the structured content the rasterizer lays out. Word documents
//! reach it through their semantic-HTML translation; HTML input is parsed
//! directly.

use scraper::{ElementRef, Html};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub code: bool,
}

/// A run of text with uniform inline style. A span whose text is `"\n"` is a
/// hard line break.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: SpanStyle::default(),
        }
    }

    pub fn line_break() -> Self {
        Self::plain("\n")
    }

    pub fn is_break(&self) -> bool {
        self.text == "\n"
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Start,
    Center,
    End,
    Justify,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableCell {
    pub spans: Vec<Span>,
    pub header: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading {
        level: u8,
        spans: Vec<Span>,
        align: Option<Align>,
    },
    Title {
        spans: Vec<Span>,
        align: Option<Align>,
    },
    Subtitle {
        spans: Vec<Span>,
        align: Option<Align>,
    },
    /// `align: None` takes the stylesheet's paragraph alignment.
    Paragraph {
        spans: Vec<Span>,
        align: Option<Align>,
    },
    Quote {
        intense: bool,
        blocks: Vec<Block>,
    },
    List {
        ordered: bool,
        items: Vec<Vec<Block>>,
    },
    Table {
        rows: Vec<Vec<TableCell>>,
    },
    Preformatted {
        text: String,
    },
    Rule,
}

/// Parse an HTML document or fragment into blocks.
pub fn parse_html(html: &str) -> Vec<Block> {
    let doc = Html::parse_document(html);
    let root = doc.root_element();
    let mut builder = BlockBuilder::default();
    builder.container(root, SpanStyle::default());
    builder.finish()
}

/// Text of the document's `<title>`, if it has a non-empty one.
pub fn html_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    find_element(doc.root_element(), "title")
        .map(|t| normalize_ws(&t.text().collect::<String>()).trim().to_string())
        .filter(|t| !t.is_empty())
}

fn find_element<'a>(element: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    if element.value().name() == name {
        return Some(element);
    }
    element
        .children()
        .filter_map(ElementRef::wrap)
        .find_map(|child| find_element(child, name))
}

const SKIPPED: &[&str] = &[
    "head", "script", "style", "title", "meta", "link", "noscript", "template", "img", "svg",
];

const CONTAINERS: &[&str] = &[
    "html", "body", "div", "section", "article", "main", "header", "footer", "nav", "aside",
    "figure", "figcaption", "form", "fieldset", "center", "dl", "dd", "dt", "address",
];

fn normalize_ws(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !last_space {
                out.push(' ');
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out
}

fn has_class(element: &ElementRef, class: &str) -> bool {
    element
        .value()
        .attr("class")
        .map(|c| c.split_whitespace().any(|x| x.eq_ignore_ascii_case(class)))
        .unwrap_or(false)
}

/// Alignment from `style="text-align: ..."` or an alignment class.
fn element_align(element: &ElementRef) -> Option<Align> {
    if let Some(style) = element.value().attr("style") {
        let style = style.to_ascii_lowercase();
        if let Some(pos) = style.find("text-align") {
            let value = style[pos..]
                .split(':')
                .nth(1)
                .map(|v| v.split(';').next().unwrap_or("").trim().to_string())
                .unwrap_or_default();
            match value.as_str() {
                "center" => return Some(Align::Center),
                "right" | "end" => return Some(Align::End),
                "justify" => return Some(Align::Justify),
                "left" | "start" => return Some(Align::Start),
                _ => {}
            }
        }
    }
    if let Some(align) = element.value().attr("align") {
        match align.to_ascii_lowercase().as_str() {
            "center" => return Some(Align::Center),
            "right" => return Some(Align::End),
            "justify" => return Some(Align::Justify),
            _ => {}
        }
    }
    if has_class(element, "docx-center") || has_class(element, "center") {
        Some(Align::Center)
    } else if has_class(element, "docx-right") || has_class(element, "right") {
        Some(Align::End)
    } else if has_class(element, "docx-justify") || has_class(element, "justify") {
        Some(Align::Justify)
    } else {
        None
    }
}

fn inline_style(name: &str, base: SpanStyle) -> SpanStyle {
    let mut style = base;
    match name {
        "b" | "strong" | "th" => style.bold = true,
        "i" | "em" | "cite" | "var" | "dfn" => style.italic = true,
        "u" | "ins" => style.underline = true,
        "s" | "strike" | "del" => style.strike = true,
        "code" | "kbd" | "samp" | "tt" => style.code = true,
        _ => {}
    }
    style
}

/// Collect inline content below `element` into `out`.
fn collect_inline(element: ElementRef, style: SpanStyle, out: &mut Vec<Span>) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let text = normalize_ws(text);
            if !text.is_empty() {
                out.push(Span { text, style });
            }
        } else if let Some(el) = ElementRef::wrap(child) {
            let name = el.value().name();
            if SKIPPED.contains(&name) {
                continue;
            }
            if name == "br" {
                out.push(Span::line_break());
                continue;
            }
            collect_inline(el, inline_style(name, style), out);
        }
    }
}

/// Drop leading/trailing whitespace-only content and trim the ends.
fn tidy(mut spans: Vec<Span>) -> Vec<Span> {
    while spans.first().is_some_and(|s| !s.is_break() && s.text.trim().is_empty()) {
        spans.remove(0);
    }
    while spans
        .last()
        .is_some_and(|s| s.is_break() || s.text.trim().is_empty())
    {
        spans.pop();
    }
    if let Some(first) = spans.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = spans.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    spans
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    pending: Vec<Span>,
}

impl BlockBuilder {
    fn flush(&mut self) {
        let spans = tidy(std::mem::take(&mut self.pending));
        if !spans.is_empty() {
            self.blocks.push(Block::Paragraph { spans, align: None });
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }

    fn push(&mut self, block: Block) {
        self.flush();
        self.blocks.push(block);
    }

    /// Walk a container's children, turning loose inline content into
    /// paragraphs between block-level children.
    fn container(&mut self, element: ElementRef, style: SpanStyle) {
        for child in element.children() {
            if let Some(text) = child.value().as_text() {
                let text = normalize_ws(text);
                if !text.is_empty() {
                    self.pending.push(Span { text, style });
                }
            } else if let Some(el) = ElementRef::wrap(child) {
                self.element(el, style);
            }
        }
    }

    fn element(&mut self, el: ElementRef, style: SpanStyle) {
        let name = el.value().name();
        if SKIPPED.contains(&name) {
            return;
        }
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let mut spans = Vec::new();
                collect_inline(el, style, &mut spans);
                let spans = tidy(spans);
                if spans.is_empty() {
                    return;
                }
                let align = element_align(&el);
                let block = if has_class(&el, "title") {
                    Block::Title { spans, align }
                } else if has_class(&el, "subtitle") {
                    Block::Subtitle { spans, align }
                } else {
                    let level = name[1..].parse().unwrap_or(1);
                    Block::Heading { level, spans, align }
                };
                self.push(block);
            }
            "p" => {
                let mut spans = Vec::new();
                collect_inline(el, style, &mut spans);
                let spans = tidy(spans);
                if spans.is_empty() {
                    self.flush();
                    return;
                }
                let align = element_align(&el);
                let block = if has_class(&el, "title") {
                    Block::Title { spans, align }
                } else if has_class(&el, "subtitle") {
                    Block::Subtitle { spans, align }
                } else {
                    Block::Paragraph { spans, align }
                };
                self.push(block);
            }
            "blockquote" => {
                let mut inner = BlockBuilder::default();
                inner.container(el, style);
                let blocks = inner.finish();
                if !blocks.is_empty() {
                    self.push(Block::Quote {
                        intense: has_class(&el, "intense"),
                        blocks,
                    });
                }
            }
            "ul" | "ol" => {
                let items: Vec<Vec<Block>> = el
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|li| li.value().name() == "li")
                    .map(|li| {
                        let mut inner = BlockBuilder::default();
                        inner.container(li, style);
                        inner.finish()
                    })
                    .collect();
                if !items.is_empty() {
                    self.push(Block::List {
                        ordered: name == "ol",
                        items,
                    });
                }
            }
            "li" => {
                // Stray list item outside a list.
                let mut inner = BlockBuilder::default();
                inner.container(el, style);
                self.push(Block::List {
                    ordered: false,
                    items: vec![inner.finish()],
                });
            }
            "table" => {
                let rows = table_rows(el, style);
                if !rows.is_empty() {
                    self.push(Block::Table { rows });
                }
            }
            "pre" => {
                let text: String = el.text().collect();
                let text = text.trim_matches('\n').to_string();
                self.push(Block::Preformatted { text });
            }
            "hr" => self.push(Block::Rule),
            "br" => self.pending.push(Span::line_break()),
            _ if CONTAINERS.contains(&name) => {
                self.flush();
                self.container(el, style);
                self.flush();
            }
            _ => collect_inline(el, inline_style(name, style), &mut self.pending),
        }
    }
}

fn table_rows(table: ElementRef, style: SpanStyle) -> Vec<Vec<TableCell>> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "thead" | "tbody" | "tfoot" => rows.extend(table_rows(child, style)),
            "tr" => {
                let cells: Vec<TableCell> = child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|c| matches!(c.value().name(), "td" | "th"))
                    .map(|c| {
                        let header = c.value().name() == "th";
                        let mut spans = Vec::new();
                        collect_inline(c, inline_style(c.value().name(), style), &mut spans);
                        TableCell {
                            spans: tidy(spans),
                            header,
                        }
                    })
                    .collect();
                if !cells.is_empty() {
                    rows.push(cells);
                }
            }
            _ => {}
        }
    }
    rows
}

/// Concatenated text of a span run, for tests and logging.
pub fn spans_text(spans: &[Span]) -> String {
    spans.iter().map(|s| s.text.as_str()).collect()
}
