//! MIME type detection and mapping utilities.

use std::path::Path;

/// MIME type for the extensions the converter accepts.
pub fn mime_from_extension(ext: &str) -> &'static str {
    match ext.to_lowercase().as_str() {
        // Word processing
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",

        // Spreadsheets
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",

        // Presentations
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",

        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",

        // Text
        "txt" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "csv" => "text/csv",
        "rtf" => "application/rtf",
        "html" | "htm" => "text/html",

        "pdf" => "application/pdf",

        _ => "application/octet-stream",
    }
}

/// Detect MIME type from a file path, asking `mime_guess` for extensions
/// outside the converter's own table.
pub fn mime_from_path(path: &Path) -> String {
    let known = path
        .extension()
        .and_then(|e| e.to_str())
        .map(mime_from_extension)
        .unwrap_or("application/octet-stream");
    if known != "application/octet-stream" {
        return known.to_string();
    }
    mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension("jpg"), "image/jpeg");
        assert_eq!(
            mime_from_extension("DOCX"),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        );
        assert_eq!(mime_from_extension("unknown"), "application/octet-stream");
    }

    #[test]
    fn test_mime_from_path() {
        assert_eq!(mime_from_path(Path::new("slides.pptx")),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation");
        assert_eq!(mime_from_path(Path::new("archive.zip")), "application/zip");
        assert_eq!(mime_from_path(Path::new("noext")), "application/octet-stream");
    }
}
