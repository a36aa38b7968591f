//! Core document properties from `docProps/core.xml`.

use quick_xml::events::Event;
use quick_xml::Reader;

use convert_utils::xml::local_name;

/// The properties the renderer uses for the PDF document info.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreProperties {
    pub title: Option<String>,
    pub creator: Option<String>,
    pub subject: Option<String>,
}

/// Parse `dc:title`, `dc:creator` and `dc:subject`. Blank values are ignored.
pub fn parse_core_properties(xml: &str) -> CoreProperties {
    let mut props = CoreProperties::default();
    let mut reader = Reader::from_str(xml);
    let mut current = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => current = local_name(e),
            Ok(Event::End(_)) => current.clear(),
            Ok(Event::Text(ref e)) => {
                let Ok(text) = e.unescape() else { continue };
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let slot = match current.as_str() {
                    "title" => &mut props.title,
                    "creator" => &mut props.creator,
                    "subject" => &mut props.subject,
                    _ => continue,
                };
                slot.get_or_insert_with(|| text.to_string());
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
    }

    props
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_core_properties() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties"
    xmlns:dc="http://purl.org/dc/elements/1.1/">
  <dc:title>Annual Report</dc:title>
  <dc:creator>Finance Team</dc:creator>
  <dc:subject>   </dc:subject>
</cp:coreProperties>"#;
        let props = parse_core_properties(xml);
        assert_eq!(props.title.as_deref(), Some("Annual Report"));
        assert_eq!(props.creator.as_deref(), Some("Finance Team"));
        assert_eq!(props.subject, None);
    }

    #[test]
    fn test_garbage_gives_defaults() {
        assert_eq!(parse_core_properties("not xml at all"), CoreProperties::default());
    }
}
