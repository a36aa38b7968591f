//! Core types shared by every renderer in the document-to-PDF pipeline.

pub mod artifact;
pub mod error;
pub mod geometry;
pub mod options;
pub mod plugin;
pub mod source;
