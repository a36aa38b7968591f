//! Character encoding detection and conversion.

use encoding_rs::Encoding;

/// Decode text bytes to UTF-8, returning the text and the encoding used.
/// BOM first, then strict UTF-8, then Windows-1252.
pub fn decode_to_utf8(bytes: &[u8]) -> (String, &'static str) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return (text.into_owned(), encoding.name());
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => (s.to_string(), "UTF-8"),
        Err(_) => {
            // Older documents are most often Windows-1252.
            log::debug!("Input is not valid UTF-8, decoding as windows-1252");
            let (result, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            (result.into_owned(), "windows-1252")
        }
    }
}

/// Decode an HTML document, honoring a `<meta charset>` declaration when no
/// BOM is present.
pub fn decode_html(bytes: &[u8]) -> (String, &'static str) {
    if Encoding::for_bom(bytes).is_none() {
        if let Some(encoding) = sniff_meta_charset(bytes).and_then(|l| Encoding::for_label(l.as_bytes())) {
            let (text, _) = encoding.decode_without_bom_handling(bytes);
            return (text.into_owned(), encoding.name());
        }
    }
    decode_to_utf8(bytes)
}

/// Look for `charset=...` in the first kilobyte of an HTML document.
pub fn sniff_meta_charset(bytes: &[u8]) -> Option<String> {
    let head = &bytes[..bytes.len().min(1024)];
    let head_str = String::from_utf8_lossy(head).to_ascii_lowercase();

    let start = head_str.find("charset=")? + "charset=".len();
    let rest = head_str[start..].trim_start_matches(['"', '\'']);
    let label: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
        .collect();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}
