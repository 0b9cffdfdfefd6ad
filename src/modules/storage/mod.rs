//! Storage module for file management
//!
//! Provides the local disk store for raw uploads and their converted
//! PDF renditions.

mod local_storage;

pub use local_storage::{LocalStorage, StorageArea};
