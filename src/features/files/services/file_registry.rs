use tokio::sync::Mutex;

use crate::features::files::models::FileRecord;

/// Ordered in-memory list of uploaded file records
///
/// Records are not unique: uploading the same name twice yields two entries.
/// Contents are lost on restart.
#[derive(Default)]
pub struct FileRegistry {
    records: Mutex<Vec<FileRecord>>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add(&self, record: FileRecord) {
        self.records.lock().await.push(record);
    }

    /// Records owned by `owner`, in insertion order
    pub async fn list_for(&self, owner: &str) -> Vec<FileRecord> {
        self.records
            .lock()
            .await
            .iter()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect()
    }

    /// Remove and return the first record matching both owner and filename
    ///
    /// Lookup and removal happen under one lock, so concurrent deletes of a
    /// single record succeed at most once.
    pub async fn remove_owned(&self, owner: &str, filename: &str) -> Option<FileRecord> {
        let mut records = self.records.lock().await;
        let index = records
            .iter()
            .position(|r| r.owner == owner && r.filename == filename)?;
        Some(records.remove(index))
    }
}
