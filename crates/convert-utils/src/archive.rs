//! In-memory ZIP access for Office Open XML containers.

use std::io::{self, Cursor, Read, Write};

use zip::read::ZipArchive;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Largest entry [`ZipReader::read_string`] will inflate: 64 MiB.
pub const MAX_ENTRY_SIZE: u64 = 64 * 1024 * 1024;

/// Read-only view over a ZIP archive held in memory.
pub struct ZipReader<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> ZipReader<'a> {
    pub fn open(bytes: &'a [u8]) -> io::Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))?;
        Ok(Self { archive })
    }

    /// All entry names, in archive order.
    pub fn names(&self) -> Vec<String> {
        self.archive.file_names().map(|n| n.to_string()).collect()
    }

    pub fn read_string(&mut self, name: &str) -> io::Result<String> {
        self.read_string_limited(name, MAX_ENTRY_SIZE)
    }

    /// Read an entry as UTF-8, failing with `InvalidData` once more than
    /// `limit` bytes have been inflated. The declared size is not trusted.
    pub fn read_string_limited(&mut self, name: &str, limit: u64) -> io::Result<String> {
        let entry = self.archive.by_name(name)?;
        let mut s = String::new();
        entry.take(limit.saturating_add(1)).read_to_string(&mut s)?;
        if s.len() as u64 > limit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} inflates past {} bytes", name, limit),
            ));
        }
        Ok(s)
    }
}

/// Builder for ZIP archives in memory, used to assemble OOXML fixtures.
pub struct ZipBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Add a file entry with the given content.
    pub fn add_file(&mut self, name: &str, content: &[u8]) -> io::Result<()> {
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
        self.writer.start_file(name, options)?;
        self.writer.write_all(content)?;
        Ok(())
    }

    /// Finish the archive and return its bytes.
    pub fn finish(self) -> io::Result<Vec<u8>> {
        let cursor = self.writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ZipBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zip_in_memory() {
        let mut builder = ZipBuilder::new();
        builder.add_file("[Content_Types].xml", b"<Types/>").unwrap();
        builder.add_file("word/document.xml", b"<w:document/>").unwrap();
        let bytes = builder.finish().unwrap();

        let mut reader = ZipReader::open(&bytes).unwrap();
        assert_eq!(reader.names().len(), 2);
        assert_eq!(reader.read_string("word/document.xml").unwrap(), "<w:document/>");
        assert!(reader.read_string("word/styles.xml").is_err());
    }

    #[test]
    fn test_entry_size_limit() {
        let body = "<w:t>spreadsheet row</w:t>".repeat(400);
        let mut builder = ZipBuilder::new();
        builder.add_file("xl/workbook.xml", body.as_bytes()).unwrap();
        let bytes = builder.finish().unwrap();

        let mut reader = ZipReader::open(&bytes).unwrap();
        let err = reader.read_string_limited("xl/workbook.xml", 1024).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        let full = reader
            .read_string_limited("xl/workbook.xml", body.len() as u64)
            .unwrap();
        assert_eq!(full, body);
    }

    #[test]
    fn test_not_a_zip() {
        assert!(ZipReader::open(b"\xD0\xCF\x11\xE0 legacy binary").is_err());
    }
}
