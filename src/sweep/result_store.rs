//! Scoped storage for the structured result each invocation writes.
//!
//! A slot is allocated before launch, handed to the executable via `--json`,
//! and taken exactly once afterwards. Taking a slot consumes it: the
//! filesystem store deletes the file after reading, and an absent file is
//! reported as `None` rather than an error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[allow(async_fn_in_trait)]
pub trait ResultStore {
    /// Reserve a uniquely named location for one invocation
    fn allocate(&self, thread_count: u32) -> PathBuf;

    /// Read and release a slot. `Ok(None)` when nothing was written.
    /// A document that was read is returned even if releasing it fails.
    async fn take(&self, path: &Path) -> std::io::Result<Option<Vec<u8>>>;
}

impl<S: ResultStore> ResultStore for Arc<S> {
    fn allocate(&self, thread_count: u32) -> PathBuf {
        (**self).allocate(thread_count)
    }

    async fn take(&self, path: &Path) -> std::io::Result<Option<Vec<u8>>> {
        (**self).take(path).await
    }
}

fn slot_name(thread_count: u32) -> String {
    format!("result_t{}_{}.json", thread_count, Uuid::new_v4().simple())
}

/// Result files in a scratch directory
#[derive(Debug, Clone)]
pub struct FsResultStore {
    dir: PathBuf,
}

impl FsResultStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ResultStore for FsResultStore {
    fn allocate(&self, thread_count: u32) -> PathBuf {
        self.dir.join(slot_name(thread_count))
    }

    async fn take(&self, path: &Path) -> std::io::Result<Option<Vec<u8>>> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!("Removed result file {}", path.display()),
            Err(e) => tracing::warn!("Cannot remove result file {}: {}", path.display(), e),
        }
        Ok(Some(bytes))
    }
}

/// In-memory result channel, keyed by the allocated path
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    slots: Mutex<HashMap<PathBuf, Vec<u8>>>,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a document into a previously allocated slot
    pub fn put(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        if let Ok(mut slots) = self.slots.lock() {
            slots.insert(path.into(), bytes.into());
        }
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.slots
            .lock()
            .map(|slots| slots.contains_key(path))
            .unwrap_or(false)
    }

    /// Number of documents written but not yet taken
    pub fn pending(&self) -> usize {
        self.slots.lock().map(|slots| slots.len()).unwrap_or(0)
    }
}

impl ResultStore for MemoryResultStore {
    fn allocate(&self, thread_count: u32) -> PathBuf {
        PathBuf::from("memory").join(slot_name(thread_count))
    }

    async fn take(&self, path: &Path) -> std::io::Result<Option<Vec<u8>>> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::Other, "result store poisoned"))?;
        Ok(slots.remove(path))
    }
}
