//! Plain text out of Rich Text Format.

use rtf_parser::{Lexer, Parser};

use convert_core::error::{ConvertError, Result};

/// Tokenize and parse RTF, keeping only the text. Paragraph marks become
/// blank lines so the text layout sees them as paragraph boundaries.
pub fn rtf_to_text(source: &str) -> Result<String> {
    let tokens = Lexer::scan(source)
        .map_err(|e| ConvertError::Decode(format!("RTF lexer error: {:?}", e)))?;
    let doc = Parser::new(tokens)
        .parse()
        .map_err(|e| ConvertError::Decode(format!("RTF parser error: {:?}", e)))?;

    let mut text = String::new();
    for block in &doc.body {
        if block.text == "\n" || block.text == "\r\n" {
            text.push_str("\n\n");
        } else {
            text.push_str(&block.text);
        }
    }
    log::debug!("Extracted {} characters from {} RTF blocks", text.len(), doc.body.len());
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatting_is_dropped() {
        let rtf = r"{\rtf1\ansi{\fonttbl\f0 Arial;}
\f0\fs24 Normal text \b bold text\b0  and \i italic text\i0.
\par Another paragraph.
}";
        let text = rtf_to_text(rtf).unwrap();
        assert!(text.contains("bold text"));
        assert!(text.contains("Another paragraph."));
        assert!(!text.contains("\\b"));
        assert!(!text.contains("fonttbl"));
    }
}
