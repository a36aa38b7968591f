//! XML helpers for Office Open XML parts, on top of quick-xml.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Local (namespace-stripped) name of an element.
pub fn local_name(e: &BytesStart) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

/// Value of the attribute whose local name is `key` (`w:val` matches `val`).
pub fn attr_value(e: &BytesStart, key: &str) -> Option<String> {
    e.attributes().flatten().find_map(|attr| {
        if attr.key.local_name().as_ref() == key.as_bytes() {
            Some(String::from_utf8_lossy(&attr.value).to_string())
        } else {
            None
        }
    })
}

/// Collect `attr` from every `tag_name` element, in document order.
pub fn collect_attribute(xml: &str, tag_name: &str, attr: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut values = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if local_name(e) == tag_name {
                    if let Some(v) = attr_value(e, attr) {
                        values.push(v);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    values
}

/// Escape special characters in XML text content.
pub fn escape_xml_text(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_attribute() {
        let xml = r#"<workbook><sheets><sheet name="Summary" sheetId="1"/><sheet name="Q&amp;A" sheetId="2"/></sheets></workbook>"#;
        let names = collect_attribute(xml, "sheet", "name");
        assert_eq!(names.len(), 2);
        assert_eq!(names[0], "Summary");
    }

    #[test]
    fn test_attr_value_ignores_prefix() {
        let xml = r#"<w:pStyle xmlns:w="x" w:val="Heading1"/>"#;
        let mut reader = Reader::from_str(xml);
        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) => {
                    assert_eq!(local_name(e), "pStyle");
                    assert_eq!(attr_value(e, "val").as_deref(), Some("Heading1"));
                    assert_eq!(attr_value(e, "missing"), None);
                    break;
                }
                Ok(Event::Eof) => panic!("element not found"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_xml_text("a < b & c"), "a &lt; b &amp; c");
    }
}
