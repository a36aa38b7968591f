//! Input files and their classification into renderable formats.

use std::path::Path;

use log::debug;

use crate::error::{ConvertError, Result};
use crate::options::DEFAULT_MAX_FILE_SIZE;

/// An accepted input file. Renderers only ever borrow it.
#[derive(Debug, Clone)]
pub struct SourceFile {
    bytes: Vec<u8>,
    mime: Option<String>,
    name: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        let mime = mime
            .map(|m| m.trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty());
        Self {
            bytes,
            mime,
            name: name.into(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Declared MIME type, lowercased. May be absent or wrong.
    pub fn mime(&self) -> Option<&str> {
        self.mime.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lowercased extension of the file name, without the dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .or_else(|| {
                // Path treats ".docx" as a stem, not an extension.
                self.name
                    .strip_prefix('.')
                    .filter(|rest| !rest.is_empty() && !rest.contains('.'))
                    .map(|rest| rest.to_ascii_lowercase())
            })
    }

    /// File name without its last extension, for document titles.
    pub fn stem(&self) -> &str {
        match self.name.rsplit_once('.') {
            Some((base, _)) if !base.is_empty() => base,
            _ => &self.name,
        }
    }

    pub fn format(&self) -> Result<SourceFormat> {
        classify(self.mime(), self.extension().as_deref())
    }
}

/// Closed set of renderable source families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Image,
    WordDocument,
    Spreadsheet,
    Presentation,
    Text,
    Html,
    Pdf,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 7] = [
        SourceFormat::Image,
        SourceFormat::WordDocument,
        SourceFormat::Spreadsheet,
        SourceFormat::Presentation,
        SourceFormat::Text,
        SourceFormat::Html,
        SourceFormat::Pdf,
    ];

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "doc" | "docx" => Some(SourceFormat::WordDocument),
            "xls" | "xlsx" => Some(SourceFormat::Spreadsheet),
            "ppt" | "pptx" => Some(SourceFormat::Presentation),
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "tif" | "tiff" => {
                Some(SourceFormat::Image)
            }
            "txt" | "rtf" | "md" | "markdown" | "csv" => Some(SourceFormat::Text),
            "html" | "htm" => Some(SourceFormat::Html),
            "pdf" => Some(SourceFormat::Pdf),
            _ => None,
        }
    }

    /// Match a declared MIME type against the known families.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let mime = mime.to_ascii_lowercase();
        if mime.starts_with("image/") {
            Some(SourceFormat::Image)
        } else if mime == "application/pdf" {
            Some(SourceFormat::Pdf)
        } else if mime.contains("html") {
            Some(SourceFormat::Html)
        } else if mime.contains("msword") || mime.contains("wordprocessingml") {
            Some(SourceFormat::WordDocument)
        } else if mime.contains("ms-excel") || mime.contains("spreadsheetml") {
            Some(SourceFormat::Spreadsheet)
        } else if mime.contains("ms-powerpoint") || mime.contains("presentationml") {
            Some(SourceFormat::Presentation)
        } else if mime.starts_with("text/") || mime == "application/rtf" {
            Some(SourceFormat::Text)
        } else {
            None
        }
    }
}

/// Resolve a source family: MIME first, extension as fallback.
///
/// A generic text MIME is refined by the extension (browsers often report
/// `text/plain` for `.htm` or `.md`). On failure the error names both signals.
pub fn classify(mime: Option<&str>, extension: Option<&str>) -> Result<SourceFormat> {
    let by_mime = mime.and_then(SourceFormat::from_mime);
    let by_ext = extension.and_then(SourceFormat::from_extension);

    let resolved = match (by_mime, by_ext) {
        (Some(SourceFormat::Text), Some(ext)) => Some(ext),
        (Some(m), _) => Some(m),
        (None, ext) => ext,
    };

    match resolved {
        Some(format) => {
            debug!(
                "Classified {:?} / {:?} as {:?}",
                mime.unwrap_or("-"),
                extension.unwrap_or("-"),
                format
            );
            Ok(format)
        }
        None => Err(ConvertError::UnsupportedFormat(format!(
            "{} (.{})",
            mime.unwrap_or("unknown"),
            extension.unwrap_or("")
        ))),
    }
}

/// The upload form's gate: a MIME allow-list and a size ceiling.
#[derive(Debug, Clone)]
pub struct AdmissionPolicy {
    allowed_mime: Vec<String>,
    max_bytes: u64,
}

impl AdmissionPolicy {
    pub fn new(allowed_mime: Vec<String>, max_bytes: u64) -> Self {
        Self {
            allowed_mime,
            max_bytes,
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Reject files over the ceiling or with a MIME type outside the list.
    /// Files with no declared MIME are judged by extension alone.
    pub fn admit(&self, file: &SourceFile) -> Result<()> {
        if file.size() > self.max_bytes {
            return Err(ConvertError::TooLarge {
                size: file.size(),
                limit: self.max_bytes,
            });
        }
        match file.mime() {
            Some(mime) if mime != "application/octet-stream" => {
                if self.allowed_mime.iter().any(|m| m == mime) {
                    Ok(())
                } else {
                    Err(ConvertError::UnsupportedFormat(mime.to_string()))
                }
            }
            _ => file.format().map(|_| ()),
        }
    }
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        let allowed = [
            "application/pdf",
            "application/msword",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "application/vnd.ms-excel",
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "application/vnd.ms-powerpoint",
            "application/vnd.openxmlformats-officedocument.presentationml.presentation",
            "image/jpeg",
            "image/png",
            "image/gif",
            "image/bmp",
            "image/webp",
            "image/tiff",
            "text/plain",
            "text/html",
            "text/csv",
            "text/markdown",
            "text/rtf",
            "application/rtf",
        ];
        Self::new(
            allowed.iter().map(|s| s.to_string()).collect(),
            DEFAULT_MAX_FILE_SIZE,
        )
    }
}
