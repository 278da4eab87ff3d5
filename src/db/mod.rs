pub mod json_file;
pub mod memory;
pub mod sqlite;

pub use json_file::JsonFileSlots;
pub use memory::MemorySlots;
pub use sqlite::SqliteSlots;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Invalid slot key: {0}")]
    InvalidKey(String),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// A local storage medium holding named string slots.
///
/// Each slot is read and written whole; there is no partial update.
pub trait SlotStorage: Send + Sync {
    /// Current value of the slot, `None` if it was never written.
    fn read_slot(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the slot's value.
    fn write_slot(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Short backend name for health reporting.
    fn backend_name(&self) -> &'static str;
}
