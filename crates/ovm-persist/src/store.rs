use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::models::{HistoryEntry, ThreadId};
use crate::record::RecordHandle;

/// Per-thread conversation history
/// 
/// Call sites depend on this trait only, so the backing storage can change
/// (file, embedded key-value store) without touching them.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Entries of a thread in conversation order (empty if unknown)
    async fn get(&self, thread_id: ThreadId) -> Vec<HistoryEntry>;
    
    /// Append one entry and persist
    async fn append(&self, thread_id: ThreadId, entry: HistoryEntry) -> Result<()>;
    
    /// Clear a thread's history and persist
    async fn reset(&self, thread_id: ThreadId) -> Result<()>;
    
    /// Write the whole store to its backing record
    async fn persist(&self) -> Result<()>;
    
    /// Sum of the character lengths of all entries in a thread
    async fn total_chars(&self, thread_id: ThreadId) -> usize {
        self.get(thread_id)
            .await
            .iter()
            .map(HistoryEntry::char_len)
            .sum()
    }
}

type ThreadMap = BTreeMap<ThreadId, Vec<HistoryEntry>>;

/// History store kept in memory and mirrored to one record.
///
/// Every mutation rewrites the whole record. Writes happen while the map's
/// write lock is held, so snapshots reach the record in mutation order.
pub struct RecordStore {
    record: Arc<dyn RecordHandle>,
    threads: RwLock<ThreadMap>,
}

impl RecordStore {
    /// Load from `record`. A missing or unreadable record yields an empty
    /// store; nothing is repaired or retried.
    pub async fn load(record: Arc<dyn RecordHandle>) -> Self {
        let threads = match record.read().await {
            Ok(Some(raw)) => match serde_json::from_str::<ThreadMap>(&raw) {
                Ok(threads) => {
                    tracing::info!(threads = threads.len(), "Loaded thread histories");
                    threads
                }
                Err(e) => {
                    tracing::warn!(error = %e, "History record is corrupt, starting empty");
                    ThreadMap::new()
                }
            },
            Ok(None) => {
                tracing::info!("No history record found, starting empty");
                ThreadMap::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read history record, starting empty");
                ThreadMap::new()
            }
        };
        
        Self {
            record,
            threads: RwLock::new(threads),
        }
    }
    
    /// Number of threads with a (possibly empty) history
    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }
    
    async fn write_snapshot(&self, threads: &ThreadMap) -> Result<()> {
        let raw = serde_json::to_string(threads)?;
        self.record.write(&raw).await
    }
}

#[async_trait]
impl HistoryStore for RecordStore {
    async fn get(&self, thread_id: ThreadId) -> Vec<HistoryEntry> {
        self.threads
            .read()
            .await
            .get(&thread_id)
            .cloned()
            .unwrap_or_default()
    }
    
    async fn append(&self, thread_id: ThreadId, entry: HistoryEntry) -> Result<()> {
        let mut threads = self.threads.write().await;
        threads.entry(thread_id).or_default().push(entry);
        self.write_snapshot(&threads).await
    }
    
    async fn reset(&self, thread_id: ThreadId) -> Result<()> {
        let mut threads = self.threads.write().await;
        threads.insert(thread_id, Vec::new());
        self.write_snapshot(&threads).await
    }
    
    async fn persist(&self) -> Result<()> {
        let threads = self.threads.write().await;
        self.write_snapshot(&threads).await
    }
}
