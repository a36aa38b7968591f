//! Document-to-PDF conversion: type dispatch over the format renderers and
//! packaging of the finished artifact for preview and download.

pub mod converter;
pub mod package;

pub use converter::{load_source, load_source_within, Converter};
pub use package::{download_file_name, save_artifact, PreviewRegistry, DEFAULT_FILE_NAME};
