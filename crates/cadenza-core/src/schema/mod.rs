//! Snapshot persistence: a key-value blob store holding the whole catalog.

mod db;
mod migrations;

pub use db::{SnapshotDatabase, SqliteSnapshotStore};
pub use migrations::{Migration, MIGRATIONS};

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{Error, Result};

/// Opens handles onto a snapshot store.
pub trait SnapshotStore: std::fmt::Debug + Send + Sync {
    fn open(&self) -> Result<Box<dyn SnapshotHandle>>;
}

/// An open snapshot store. Must be closed exactly once, on every path.
pub trait SnapshotHandle: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn put(&mut self, key: &str, value: &str) -> Result<()>;

    fn close(self: Box<Self>) -> Result<()>;
}

/// In-memory snapshot store. Clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    open_handles: Arc<AtomicUsize>,
    read_only: bool,
}

impl MemorySnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose handles reject every write.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Number of handles opened and not yet closed.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn open(&self) -> Result<Box<dyn SnapshotHandle>> {
        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemorySnapshotHandle {
            store: self.clone(),
        }))
    }
}

#[derive(Debug)]
struct MemorySnapshotHandle {
    store: MemorySnapshotStore,
}

impl SnapshotHandle for MemorySnapshotHandle {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.store.get(key))
    }

    fn put(&mut self, key: &str, value: &str) -> Result<()> {
        if self.store.read_only {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "snapshot store is read-only",
            )));
        }
        self.store.insert(key, value);
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<()> {
        self.store.open_handles.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}
