//! Convert `word/document.xml` into semantic HTML.
//!
//! Paragraph styles go through the [`StyleMap`]: headings become
//! `<h1>`-`<h6>`, title/subtitle become classed blocks, quotes become
//! `<blockquote>` and numbered or list-styled paragraphs become list items.
//! Run properties (`w:b`, `w:i`, `w:u`, `w:strike`) and mapped character
//! styles become inline tags. Tables keep their row/cell structure; rows
//! flagged with `w:tblHeader` use `<th>`. Drawings are dropped.

use std::collections::HashMap;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use convert_utils::xml::{attr_value, escape_xml_text, local_name};

use crate::styles::{SemanticTag, StyleInfo, StyleMap, StyleTarget};

/// Convert the main document XML into HTML body content.
pub fn convert_document(
    xml: &str,
    map: &StyleMap,
    styles: &HashMap<String, StyleInfo>,
    numbering: &HashMap<String, bool>,
) -> String {
    let mut reader = Reader::from_str(xml);
    let mut state = ConvertState::new(map, styles, numbering);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => state.start(&local_name(e), e),
            Ok(Event::Empty(ref e)) => {
                let local = local_name(e);
                state.start(&local, e);
                state.end(&local);
            }
            Ok(Event::Text(ref e)) => {
                if state.in_text {
                    if let Ok(text) = e.unescape() {
                        state.push_text(&text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
                state.end(&local);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("Stopped reading document.xml early: {}", e);
                break;
            }
            _ => {}
        }
    }

    state.close_list();
    state.html
}

#[derive(Default)]
struct Paragraph {
    style_id: Option<String>,
    align: Option<String>,
    num_id: Option<String>,
    buffer: String,
    has_content: bool,
}

#[derive(Default, Clone, Copy)]
struct RunFormat {
    bold: bool,
    italic: bool,
    underline: bool,
    strike: bool,
    strong: bool,
    emphasis: bool,
}

#[derive(Default)]
struct Row {
    header: bool,
    cells: Vec<String>,
}

#[derive(Default)]
struct Table {
    rows: Vec<String>,
    row: Option<Row>,
    cell: Option<String>,
}

struct ConvertState<'a> {
    map: &'a StyleMap,
    styles: &'a HashMap<String, StyleInfo>,
    numbering: &'a HashMap<String, bool>,

    html: String,
    paragraph: Option<Paragraph>,
    run: Option<RunFormat>,
    in_text: bool,
    tables: Vec<Table>,
    /// `Some(ordered)` while a list is open.
    list: Option<bool>,
}

impl<'a> ConvertState<'a> {
    fn new(
        map: &'a StyleMap,
        styles: &'a HashMap<String, StyleInfo>,
        numbering: &'a HashMap<String, bool>,
    ) -> Self {
        Self {
            map,
            styles,
            numbering,
            html: String::new(),
            paragraph: None,
            run: None,
            in_text: false,
            tables: Vec::new(),
            list: None,
        }
    }

    fn start(&mut self, local: &str, e: &BytesStart) {
        match local {
            "p" => self.paragraph = Some(Paragraph::default()),
            "pStyle" => self.set_paragraph(|p| p.style_id = attr_value(e, "val")),
            "jc" => self.set_paragraph(|p| p.align = attr_value(e, "val")),
            "numId" => self.set_paragraph(|p| p.num_id = attr_value(e, "val")),
            "r" => self.run = Some(RunFormat::default()),
            "b" => self.set_run(|r| r.bold = enabled(e)),
            "i" => self.set_run(|r| r.italic = enabled(e)),
            "u" => self.set_run(|r| r.underline = attr_value(e, "val").as_deref() != Some("none")),
            "strike" | "dstrike" => self.set_run(|r| r.strike = enabled(e)),
            "rStyle" => {
                let tag = attr_value(e, "val")
                    .and_then(|id| self.map.resolve(StyleTarget::Run, &id, self.styles));
                self.set_run(|r| match tag {
                    Some(SemanticTag::Strong) => r.strong = true,
                    Some(SemanticTag::Emphasis) => r.emphasis = true,
                    _ => {}
                });
            }
            "t" => self.in_text = true,
            "tab" if self.run.is_some() => self.push_raw(" ", true),
            "br" | "cr" if self.run.is_some() => self.push_raw("<br/>", true),
            "tbl" => {
                if self.tables.is_empty() {
                    self.close_list();
                }
                self.tables.push(Table::default());
            }
            "tr" => {
                if let Some(t) = self.tables.last_mut() {
                    t.row = Some(Row::default());
                }
            }
            "tblHeader" => {
                if let Some(row) = self.tables.last_mut().and_then(|t| t.row.as_mut()) {
                    row.header = enabled(e);
                }
            }
            "tc" => {
                if let Some(t) = self.tables.last_mut() {
                    t.cell = Some(String::new());
                }
            }
            _ => {}
        }
    }

    fn end(&mut self, local: &str) {
        match local {
            "t" => self.in_text = false,
            "r" => self.run = None,
            "p" => self.flush_paragraph(),
            "tc" => {
                if let Some(t) = self.tables.last_mut() {
                    if let (Some(cell), Some(row)) = (t.cell.take(), t.row.as_mut()) {
                        row.cells.push(cell);
                    }
                }
            }
            "tr" => {
                if let Some(t) = self.tables.last_mut() {
                    if let Some(row) = t.row.take() {
                        let tag = if row.header { "th" } else { "td" };
                        let mut out = String::from("<tr>");
                        for cell in row.cells {
                            out.push_str(&format!("<{tag}>{cell}</{tag}>"));
                        }
                        out.push_str("</tr>\n");
                        t.rows.push(out);
                    }
                }
            }
            "tbl" => {
                if let Some(table) = self.tables.pop() {
                    let html = format!("<table>\n{}</table>\n", table.rows.concat());
                    match self.tables.last_mut().and_then(|t| t.cell.as_mut()) {
                        Some(parent_cell) => parent_cell.push_str(&html),
                        None => self.html.push_str(&html),
                    }
                }
            }
            _ => {}
        }
    }

    fn set_paragraph(&mut self, f: impl FnOnce(&mut Paragraph)) {
        if let Some(p) = self.paragraph.as_mut() {
            f(p);
        }
    }

    fn set_run(&mut self, f: impl FnOnce(&mut RunFormat)) {
        if let Some(r) = self.run.as_mut() {
            f(r);
        }
    }

    fn push_raw(&mut self, s: &str, content: bool) {
        if let Some(p) = self.paragraph.as_mut() {
            p.buffer.push_str(s);
            p.has_content |= content;
        }
    }

    fn push_text(&mut self, text: &str) {
        let fmt = self.run.unwrap_or_default();
        let mut open = String::new();
        let mut close = Vec::new();
        for (on, tag) in [
            (fmt.bold || fmt.strong, "strong"),
            (fmt.italic || fmt.emphasis, "em"),
            (fmt.underline, "u"),
            (fmt.strike, "s"),
        ] {
            if on {
                open.push_str(&format!("<{}>", tag));
                close.push(format!("</{}>", tag));
            }
        }
        close.reverse();
        let html = format!("{}{}{}", open, escape_xml_text(text), close.concat());
        self.push_raw(&html, !text.trim().is_empty());
    }

    fn flush_paragraph(&mut self) {
        let Some(para) = self.paragraph.take() else {
            return;
        };
        let tag = para
            .style_id
            .as_deref()
            .and_then(|id| self.map.resolve(StyleTarget::Paragraph, id, self.styles));

        if let Some(cell) = self.tables.last_mut().and_then(|t| t.cell.as_mut()) {
            if para.has_content {
                if !cell.is_empty() {
                    cell.push_str("<br/>");
                }
                cell.push_str(&para.buffer);
            }
            return;
        }

        let numbered = para.num_id.as_deref().is_some_and(|n| n != "0");
        if numbered || tag == Some(SemanticTag::ListParagraph) {
            if !para.has_content {
                return;
            }
            let ordered = para
                .num_id
                .as_deref()
                .and_then(|n| self.numbering.get(n).copied())
                .unwrap_or(false);
            if self.list != Some(ordered) {
                self.close_list();
                self.html.push_str(if ordered { "<ol>\n" } else { "<ul>\n" });
                self.list = Some(ordered);
            }
            self.html.push_str(&format!("<li>{}</li>\n", para.buffer));
            return;
        }

        self.close_list();
        if !para.has_content {
            return;
        }

        let align = match para.align.as_deref() {
            Some("center") => Some("docx-center"),
            Some("right") | Some("end") => Some("docx-right"),
            Some("both") | Some("distribute") => Some("docx-justify"),
            _ => None,
        };
        let class = |extra: Option<&str>| {
            let names: Vec<&str> = extra.into_iter().chain(align).collect();
            if names.is_empty() {
                String::new()
            } else {
                format!(" class=\"{}\"", names.join(" "))
            }
        };
        let body = &para.buffer;
        let html = match tag {
            Some(SemanticTag::Heading(n)) => {
                let n = n.clamp(1, 6);
                format!("<h{n}{}>{body}</h{n}>\n", class(None))
            }
            Some(SemanticTag::Title) => format!("<h1{}>{body}</h1>\n", class(Some("title"))),
            Some(SemanticTag::Subtitle) => format!("<p{}>{body}</p>\n", class(Some("subtitle"))),
            Some(SemanticTag::Quote) => {
                format!("<blockquote><p{}>{body}</p></blockquote>\n", class(None))
            }
            Some(SemanticTag::IntenseQuote) => format!(
                "<blockquote class=\"intense\"><p{}>{body}</p></blockquote>\n",
                class(None)
            ),
            Some(SemanticTag::Strong) => format!("<p{}><strong>{body}</strong></p>\n", class(None)),
            Some(SemanticTag::Emphasis) => format!("<p{}><em>{body}</em></p>\n", class(None)),
            _ => format!("<p{}>{body}</p>\n", class(None)),
        };
        self.html.push_str(&html);
    }

    fn close_list(&mut self) {
        if let Some(ordered) = self.list.take() {
            self.html.push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
        }
    }
}

/// On/off run property: absent `w:val` means on.
fn enabled(e: &BytesStart) -> bool {
    !matches!(attr_value(e, "val").as_deref(), Some("0") | Some("false") | Some("off"))
}
