use ovm_persist::ThreadId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

/// One async mutex per thread.
///
/// The gateway delivers events concurrently, so two messages in the same
/// thread could otherwise interleave their append/dispatch/append sequences.
/// Holding the guard for the whole handling serializes a thread while other
/// threads proceed in parallel.
///
/// Entries nobody holds or waits on are dropped on the next `acquire`, so the
/// registry stays as large as the set of busy threads.
#[derive(Default)]
pub struct ThreadLocks {
    locks: Mutex<HashMap<ThreadId, Arc<tokio::sync::Mutex<()>>>>,
}

impl ThreadLocks {
    pub fn new() -> Self {
        Self::default()
    }
    
    /// Wait for exclusive access to `thread_id`
    pub async fn acquire(&self, thread_id: ThreadId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // the map's own reference is the only one left on idle entries
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks.entry(thread_id).or_default().clone()
        };
        lock.lock_owned().await
    }
    
    #[cfg(test)]
    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
