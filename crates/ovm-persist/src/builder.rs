use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{PersistError, Result};
use crate::record::{FileRecord, RecordHandle};
use crate::store::RecordStore;

pub struct HistoryStoreBuilder {
    record: Option<Arc<dyn RecordHandle>>,
}

impl HistoryStoreBuilder {
    pub fn new() -> Self {
        Self { record: None }
    }
    
    /// Back the store with a JSON file
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.record = Some(Arc::new(FileRecord::new(path)));
        self
    }
    
    /// Back the store with any record handle
    pub fn record(mut self, record: Arc<dyn RecordHandle>) -> Self {
        self.record = Some(record);
        self
    }
    
    pub async fn build(self) -> Result<RecordStore> {
        let record = self.record
            .ok_or_else(|| PersistError::Internal("a history record is required".to_string()))?;
        
        Ok(RecordStore::load(record).await)
    }
}

impl Default for HistoryStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
