//! Modules layer - Infrastructure components
//!
//! Contains adapters for the local filesystem and the PDF/image libraries.

pub mod pdf;
pub mod storage;
