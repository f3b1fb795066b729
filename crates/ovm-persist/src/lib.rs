pub mod builder;
pub mod error;
pub mod models;
pub mod record;
pub mod store;

pub use builder::HistoryStoreBuilder;
pub use error::{PersistError, Result};
pub use models::{HistoryEntry, Role, ThreadId};
pub use record::{FileRecord, MemoryRecord, RecordHandle};
pub use store::{HistoryStore, RecordStore};
