//! Shared helpers: MIME tables, text decoding, in-memory ZIP access and XML.

pub mod archive;
pub mod encoding;
pub mod mime;
pub mod xml;
