//! Packaging of finished artifacts: download names, saving, and revocable
//! preview references.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use convert_core::artifact::PdfArtifact;
use convert_core::error::Result;

/// Download name used when nothing is left of the original name.
pub const DEFAULT_FILE_NAME: &str = "converted.pdf";

const PREVIEW_SCHEME: &str = "blob:doc2pdf/";

/// `Report.final.docx` becomes `Report.final.pdf`. Only the last extension
/// is dropped, so a name without one (`README`) or with nothing before it
/// (`.docx`, empty) becomes [`DEFAULT_FILE_NAME`].
pub fn download_file_name(original: &str) -> String {
    let base = original.rsplit_once('.').map_or("", |(base, _)| base).trim();
    if base.is_empty() {
        DEFAULT_FILE_NAME.to_string()
    } else {
        format!("{}.pdf", base)
    }
}

/// Write `artifact` into `dir` under the name derived from `original_name`.
pub fn save_artifact(artifact: &PdfArtifact, original_name: &str, dir: &Path) -> Result<PathBuf> {
    let path = dir.join(download_file_name(original_name));
    std::fs::write(&path, artifact.bytes())?;
    log::info!("Saved {} ({} bytes)", path.display(), artifact.len());
    Ok(path)
}

/// Short-lived references to artifacts shown in a preview pane. A reference
/// keeps its artifact alive until the holder revokes it.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    entries: HashMap<String, PdfArtifact>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, artifact: PdfArtifact) -> String {
        let reference = format!("{}{}", PREVIEW_SCHEME, Uuid::new_v4());
        log::debug!("Created preview reference {}", reference);
        self.entries.insert(reference.clone(), artifact);
        reference
    }

    pub fn resolve(&self, reference: &str) -> Option<&PdfArtifact> {
        self.entries.get(reference)
    }

    /// Drop the artifact behind `reference`. Returns false if it was
    /// already revoked or never issued.
    pub fn revoke(&mut self, reference: &str) -> bool {
        let removed = self.entries.remove(reference).is_some();
        if removed {
            log::debug!("Revoked preview reference {}", reference);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact() -> PdfArtifact {
        PdfArtifact::new(b"%PDF-1.7\n%%EOF".to_vec(), 1)
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name("Report.final.docx"), "Report.final.pdf");
        assert_eq!(download_file_name("photo.JPG"), "photo.pdf");
        assert_eq!(download_file_name("noext"), "converted.pdf");
        assert_eq!(download_file_name("archive.tar.gz"), "archive.tar.pdf");
        assert_eq!(download_file_name(".docx"), "converted.pdf");
        assert_eq!(download_file_name(""), "converted.pdf");
    }

    #[test]
    fn test_save_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_artifact(&artifact(), "Budget 2024.xlsx", dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "Budget 2024.pdf");
        assert_eq!(std::fs::read(&path).unwrap(), artifact().bytes());
    }

    #[test]
    fn test_save_name_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_artifact(&artifact(), "README", dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "converted.pdf");
    }

    #[test]
    fn test_save_into_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_artifact(&artifact(), "a.txt", &dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, convert_core::error::ConvertError::Io(_)));
    }

    #[test]
    fn test_preview_reference_lifecycle() {
        let mut previews = PreviewRegistry::new();
        let first = previews.register(artifact());
        let second = previews.register(artifact());
        assert_ne!(first, second);
        assert!(first.starts_with("blob:doc2pdf/"));
        assert_eq!(previews.len(), 2);

        assert_eq!(previews.resolve(&first).unwrap().page_count(), Some(1));
        assert!(previews.revoke(&first));
        assert!(previews.resolve(&first).is_none());
        assert!(!previews.revoke(&first));
        assert_eq!(previews.len(), 1);
    }
}
