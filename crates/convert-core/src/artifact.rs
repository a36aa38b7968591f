/// A finished PDF document.
///
/// Pages are fixed once the artifact exists; packaging only reads it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfArtifact {
    bytes: Vec<u8>,
    page_count: Option<usize>,
}

impl PdfArtifact {
    /// Artifact built by a renderer, which always knows how many pages it wrote.
    pub fn new(bytes: Vec<u8>, page_count: usize) -> Self {
        Self {
            bytes,
            page_count: Some(page_count),
        }
    }

    /// Artifact whose bytes were passed through untouched. The page count is
    /// whatever could be read from the document, if anything.
    pub fn passthrough(bytes: Vec<u8>, page_count: Option<usize>) -> Self {
        Self { bytes, page_count }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn page_count(&self) -> Option<usize> {
        self.page_count
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
