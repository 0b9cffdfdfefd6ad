mod file_registry;
mod file_service;

pub use file_registry::FileRegistry;
pub use file_service::{ConversionOutcome, FileService};
