use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::Result;

/// Storage handle for the single serialized history record.
///
/// The store only ever reads the whole record at startup and overwrites the
/// whole record after a mutation; implementations need nothing finer.
#[async_trait]
pub trait RecordHandle: Send + Sync {
    /// Current contents, `None` when no record exists yet
    async fn read(&self) -> Result<Option<String>>;
    
    /// Replace the record with `contents`
    async fn write(&self, contents: &str) -> Result<()>;
}

/// Record stored as one JSON file on disk
#[derive(Debug, Clone)]
pub struct FileRecord {
    path: PathBuf,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
    
    fn temp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

#[async_trait]
impl RecordHandle for FileRecord {
    async fn read(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
    
    async fn write(&self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        
        // Write beside the target then rename, so a crash mid-write never
        // leaves a truncated record behind
        let tmp = self.temp_path();
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// In-process record, for tests and ephemeral runs
#[derive(Debug, Default)]
pub struct MemoryRecord {
    contents: Mutex<Option<String>>,
}

impl MemoryRecord {
    pub fn new() -> Self {
        Self::default()
    }
    
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
        }
    }
    
    /// Snapshot of what was last written
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl RecordHandle for MemoryRecord {
    async fn read(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }
    
    async fn write(&self, contents: &str) -> Result<()> {
        let mut guard = self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Some(contents.to_string());
        Ok(())
    }
}
