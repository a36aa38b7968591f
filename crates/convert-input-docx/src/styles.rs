//! Word style definitions and the style-name to semantic-tag map.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use convert_utils::xml::{attr_value, local_name};

/// Semantic markup a Word style is rendered as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticTag {
    /// `h1`..`h6`
    Heading(u8),
    Title,
    Subtitle,
    Strong,
    Emphasis,
    Quote,
    IntenseQuote,
    ListParagraph,
    Table,
}

/// Which kind of Word style a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleTarget {
    Paragraph,
    Run,
    Table,
}

/// One `style name => tag` mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub target: StyleTarget,
    pub style_name: String,
    pub tag: SemanticTag,
}

impl StyleRule {
    pub fn paragraph(style_name: &str, tag: SemanticTag) -> Self {
        Self::new(StyleTarget::Paragraph, style_name, tag)
    }

    pub fn run(style_name: &str, tag: SemanticTag) -> Self {
        Self::new(StyleTarget::Run, style_name, tag)
    }

    pub fn table(style_name: &str) -> Self {
        Self::new(StyleTarget::Table, style_name, SemanticTag::Table)
    }

    fn new(target: StyleTarget, style_name: &str, tag: SemanticTag) -> Self {
        Self {
            target,
            style_name: style_name.to_string(),
            tag,
        }
    }
}

/// Ordered, enumerable style map. Style names compare ignoring case and
/// spaces (`Intense Quote` matches the `IntenseQuote` id); later rules win.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleMap {
    rules: Vec<StyleRule>,
}

impl Default for StyleMap {
    fn default() -> Self {
        let mut rules: Vec<StyleRule> = (1..=6u8)
            .map(|n| StyleRule::paragraph(&format!("Heading {}", n), SemanticTag::Heading(n)))
            .collect();
        rules.extend([
            StyleRule::paragraph("Title", SemanticTag::Title),
            StyleRule::paragraph("Subtitle", SemanticTag::Subtitle),
            StyleRule::paragraph("Quote", SemanticTag::Quote),
            StyleRule::paragraph("Intense Quote", SemanticTag::IntenseQuote),
            StyleRule::paragraph("List Paragraph", SemanticTag::ListParagraph),
            StyleRule::run("Strong", SemanticTag::Strong),
            StyleRule::run("Emphasis", SemanticTag::Emphasis),
            StyleRule::table("Table Grid"),
            StyleRule::table("Normal Table"),
        ]);
        Self { rules }
    }
}

impl StyleMap {
    pub fn new(rules: Vec<StyleRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Add a rule that takes precedence over the existing ones.
    pub fn with_rule(mut self, rule: StyleRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn lookup(&self, target: StyleTarget, style_name: &str) -> Option<SemanticTag> {
        self.rules
            .iter()
            .rev()
            .find(|r| r.target == target && same_name(&r.style_name, style_name))
            .map(|r| r.tag)
    }

    /// Resolve a style id from `word/styles.xml` to a tag, trying the
    /// display name, then the id itself, then the `basedOn` chain. Paragraph
    /// styles with an outline level fall back to the matching heading.
    pub fn resolve(
        &self,
        target: StyleTarget,
        style_id: &str,
        styles: &HashMap<String, StyleInfo>,
    ) -> Option<SemanticTag> {
        let mut current = Some(style_id.to_string());
        let mut depth = 0;
        while let Some(id) = current {
            if depth > 16 {
                break;
            }
            depth += 1;
            let info = styles.get(&id);
            if let Some(tag) = info.and_then(|i| self.lookup(target, &i.name)) {
                return Some(tag);
            }
            if let Some(tag) = self.lookup(target, &id) {
                return Some(tag);
            }
            if target == StyleTarget::Paragraph {
                // Levels 0-8 are outline headings; 9 is body text.
                if let Some(level @ 0..=8) = info.and_then(|i| i.outline_level) {
                    return Some(SemanticTag::Heading((level + 1).min(6)));
                }
            }
            current = info.and_then(|i| i.based_on.clone());
        }
        // Word writes `Heading1` ids for the `heading 1` display name.
        if target == StyleTarget::Paragraph {
            let lower = style_id.to_ascii_lowercase();
            if let Some(rest) = lower.strip_prefix("heading") {
                if let Ok(n @ 1..=9) = rest.trim().parse::<u8>() {
                    return Some(SemanticTag::Heading(n.min(6)));
                }
            }
        }
        None
    }
}

fn same_name(a: &str, b: &str) -> bool {
    let squash = |s: &str| -> String {
        s.chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect()
    };
    squash(a) == squash(b)
}

/// Style information from `word/styles.xml`.
#[derive(Debug, Clone, Default)]
pub struct StyleInfo {
    /// Display name, e.g. "heading 1" or "Intense Quote".
    pub name: String,
    pub based_on: Option<String>,
    /// 0 = heading 1.
    pub outline_level: Option<u8>,
}

/// Parse `word/styles.xml` into `style id => StyleInfo`.
pub fn parse_styles(xml: &str) -> HashMap<String, StyleInfo> {
    let mut styles = HashMap::new();
    let mut reader = Reader::from_str(xml);
    let mut current: Option<(String, StyleInfo)> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match local_name(e).as_str() {
                "style" => {
                    current = attr_value(e, "styleId").map(|id| (id, StyleInfo::default()));
                }
                "name" => {
                    if let (Some((_, info)), Some(v)) = (current.as_mut(), attr_value(e, "val")) {
                        info.name = v;
                    }
                }
                "basedOn" => {
                    if let (Some((_, info)), Some(v)) = (current.as_mut(), attr_value(e, "val")) {
                        info.based_on = Some(v);
                    }
                }
                "outlineLvl" => {
                    if let Some((_, info)) = current.as_mut() {
                        info.outline_level = attr_value(e, "val").and_then(|v| v.parse().ok());
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) if e.local_name().as_ref() == b"style" => {
                if let Some((id, info)) = current.take() {
                    styles.insert(id, info);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    styles
}

/// Parse `word/numbering.xml` into `numId => ordered?` for level 0.
///
/// Paragraphs reference a `w:num`, which points at a `w:abstractNum` whose
/// first level's `numFmt` decides between bullets and numbers.
pub fn parse_numbering(xml: &str) -> HashMap<String, bool> {
    let mut abstract_ordered: HashMap<String, bool> = HashMap::new();
    let mut num_to_abstract: Vec<(String, String)> = Vec::new();

    let mut reader = Reader::from_str(xml);
    let mut abstract_id: Option<String> = None;
    let mut level: Option<String> = None;
    let mut num_id: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match local_name(e).as_str() {
                "abstractNum" => abstract_id = attr_value(e, "abstractNumId"),
                "lvl" => level = attr_value(e, "ilvl"),
                "numFmt" if level.as_deref() == Some("0") => {
                    if let (Some(id), Some(fmt)) = (abstract_id.as_ref(), attr_value(e, "val")) {
                        abstract_ordered.insert(id.clone(), fmt != "bullet");
                    }
                }
                "num" => num_id = attr_value(e, "numId"),
                "abstractNumId" => {
                    if let (Some(num), Some(abs)) = (num_id.as_ref(), attr_value(e, "val")) {
                        num_to_abstract.push((num.clone(), abs));
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"abstractNum" => abstract_id = None,
                b"lvl" => level = None,
                b"num" => num_id = None,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    num_to_abstract
        .into_iter()
        .map(|(num, abs)| {
            let ordered = abstract_ordered.get(&abs).copied().unwrap_or(false);
            (num, ordered)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:pPr><w:outlineLvl w:val="0"/></w:pPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="IntenseQuote">
    <w:name w:val="Intense Quote"/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="MyQuote">
    <w:name w:val="Company Quote"/>
    <w:basedOn w:val="IntenseQuote"/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Chapter">
    <w:name w:val="Chapter Head"/>
    <w:pPr><w:outlineLvl w:val="1"/></w:pPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="BodyOutline">
    <w:name w:val="Body Outline"/>
    <w:pPr><w:outlineLvl w:val="9"/></w:pPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Overflow">
    <w:name w:val="Overflow"/>
    <w:pPr><w:outlineLvl w:val="255"/></w:pPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Deep">
    <w:name w:val="Deep"/>
    <w:pPr><w:outlineLvl w:val="8"/></w:pPr>
  </w:style>
  <w:style w:type="character" w:styleId="Strong">
    <w:name w:val="Strong"/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Normal">
    <w:name w:val="Normal"/>
  </w:style>
</w:styles>"#;

    #[test]
    fn test_default_map_covers_required_tags() {
        let map = StyleMap::default();
        for n in 1..=6u8 {
            assert_eq!(
                map.lookup(StyleTarget::Paragraph, &format!("heading {}", n)),
                Some(SemanticTag::Heading(n))
            );
        }
        let tags: Vec<SemanticTag> = map.rules().iter().map(|r| r.tag).collect();
        for tag in [
            SemanticTag::Title,
            SemanticTag::Subtitle,
            SemanticTag::Strong,
            SemanticTag::Emphasis,
            SemanticTag::Quote,
            SemanticTag::IntenseQuote,
            SemanticTag::ListParagraph,
            SemanticTag::Table,
        ] {
            assert!(tags.contains(&tag), "missing {:?}", tag);
        }
    }

    #[test]
    fn test_lookup_respects_target() {
        let map = StyleMap::default();
        assert_eq!(map.lookup(StyleTarget::Run, "strong"), Some(SemanticTag::Strong));
        assert_eq!(map.lookup(StyleTarget::Paragraph, "Strong"), None);
    }

    #[test]
    fn test_later_rule_wins() {
        let map = StyleMap::default().with_rule(StyleRule::paragraph("Quote", SemanticTag::IntenseQuote));
        assert_eq!(
            map.lookup(StyleTarget::Paragraph, "Quote"),
            Some(SemanticTag::IntenseQuote)
        );
    }

    #[test]
    fn test_resolve_through_styles() {
        let styles = parse_styles(STYLES);
        let map = StyleMap::default();
        let para = StyleTarget::Paragraph;
        assert_eq!(map.resolve(para, "Heading1", &styles), Some(SemanticTag::Heading(1)));
        assert_eq!(map.resolve(para, "MyQuote", &styles), Some(SemanticTag::IntenseQuote));
        assert_eq!(map.resolve(para, "Chapter", &styles), Some(SemanticTag::Heading(2)));
        assert_eq!(map.resolve(para, "Normal", &styles), None);
        assert_eq!(
            map.resolve(StyleTarget::Run, "Strong", &styles),
            Some(SemanticTag::Strong)
        );
    }

    #[test]
    fn test_outline_level_bounds() {
        let styles = parse_styles(STYLES);
        let map = StyleMap::default();
        let para = StyleTarget::Paragraph;
        assert_eq!(map.resolve(para, "Deep", &styles), Some(SemanticTag::Heading(6)));
        assert_eq!(map.resolve(para, "BodyOutline", &styles), None);
        assert_eq!(map.resolve(para, "Overflow", &styles), None);
    }

    #[test]
    fn test_resolve_heading_id_without_styles_part() {
        let map = StyleMap::default();
        let none = HashMap::new();
        assert_eq!(
            map.resolve(StyleTarget::Paragraph, "Heading3", &none),
            Some(SemanticTag::Heading(3))
        );
        assert_eq!(
            map.resolve(StyleTarget::Paragraph, "Heading8", &none),
            Some(SemanticTag::Heading(6))
        );
    }

    #[test]
    fn test_parse_numbering() {
        let xml = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:abstractNum w:abstractNumId="0">
    <w:lvl w:ilvl="0"><w:numFmt w:val="bullet"/></w:lvl>
    <w:lvl w:ilvl="1"><w:numFmt w:val="decimal"/></w:lvl>
  </w:abstractNum>
  <w:abstractNum w:abstractNumId="1">
    <w:lvl w:ilvl="0"><w:numFmt w:val="decimal"/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
  <w:num w:numId="2"><w:abstractNumId w:val="1"/></w:num>
</w:numbering>"#;
        let map = parse_numbering(xml);
        assert_eq!(map.get("1"), Some(&false));
        assert_eq!(map.get("2"), Some(&true));
    }
}
