//! In-memory resource store.
//!
//! This is the reference implementation of `ResourceManager`.
//! Durable records live in one append-only vector; every open handle keeps
//! its own staging buffer plus the durable length it saw at `begin()`.
//!
//! ## Semantics
//!
//! - **Snapshot reads**: a handle sees durable records committed before it
//!   began, then its own staged records. Other handles' staged writes and
//!   later commits are invisible to it.
//! - **Commit** appends the staging buffer to the durable vector atomically.
//! - **Rollback** drops the staging buffer.
//! - **Bounded**: with `StoreConfig::max_open_handles`, `begin()` fails fast
//!   instead of waiting for a handle to close.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use hashbrown::HashMap;
use parking_lot::{Mutex, RwLock};

use crate::model::{Predicate, Record, RecordId};
use crate::{Error, Result};
use super::{HandleId, ResourceManager, StoreConfig, StoredRecord};

// ============================================================================
// MemoryStore
// ============================================================================

/// In-memory, snapshot-isolated record store. Cloning shares the store.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryInner>,
}

struct MemoryInner {
    config: StoreConfig,
    durable: RwLock<Vec<StoredRecord>>,
    /// Lock order: `open` before `durable`.
    open: Mutex<HashMap<HandleId, OpenHandle>>,
    next_handle_id: AtomicU64,
    next_record_id: AtomicU64,
}

struct OpenHandle {
    /// Durable length at `begin()`.
    snapshot: usize,
    staged: Vec<StoredRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            inner: Arc::new(MemoryInner {
                config,
                durable: RwLock::new(Vec::new()),
                open: Mutex::new(HashMap::new()),
                next_handle_id: AtomicU64::new(1),
                next_record_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }

    /// Number of handles begun and not yet committed or rolled back.
    pub fn open_handles(&self) -> usize {
        self.inner.open.lock().len()
    }

    pub fn durable_count(&self) -> usize {
        self.inner.durable.read().len()
    }

    pub fn is_open(&self, handle: HandleId) -> bool {
        self.inner.open.lock().contains_key(&handle)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("config", &self.inner.config)
            .field("open_handles", &self.open_handles())
            .field("durable", &self.durable_count())
            .finish()
    }
}

// ============================================================================
// ResourceManager impl
// ============================================================================

impl ResourceManager for MemoryStore {
    fn begin(&self) -> Result<HandleId> {
        let mut open = self.inner.open.lock();
        if let Some(max) = self.inner.config.max_open_handles {
            if open.len() >= max {
                return Err(Error::ResourceUnavailable(format!(
                    "all {max} handles are in use"
                )));
            }
        }

        let id = HandleId(self.inner.next_handle_id.fetch_add(1, Ordering::Relaxed));
        let snapshot = self.inner.durable.read().len();
        open.insert(id, OpenHandle { snapshot, staged: Vec::new() });
        tracing::debug!(handle = %id, snapshot, "begin");
        Ok(id)
    }

    fn write(&self, handle: HandleId, record: Record) -> Result<RecordId> {
        let mut open = self.inner.open.lock();
        let h = open.get_mut(&handle).ok_or(Error::HandleClosed(handle))?;
        let id = RecordId(self.inner.next_record_id.fetch_add(1, Ordering::Relaxed));
        h.staged.push(StoredRecord { id, record });
        Ok(id)
    }

    fn read(&self, handle: HandleId, predicate: &Predicate) -> Result<Vec<Record>> {
        let open = self.inner.open.lock();
        let h = open.get(&handle).ok_or(Error::HandleClosed(handle))?;
        let durable = self.inner.durable.read();

        Ok(durable[..h.snapshot]
            .iter()
            .chain(h.staged.iter())
            .filter(|e| predicate.matches(&e.record))
            .map(|e| e.record.clone())
            .collect())
    }

    fn commit(&self, handle: HandleId) -> Result<()> {
        let mut open = self.inner.open.lock();
        let h = open.remove(&handle).ok_or(Error::HandleClosed(handle))?;
        let staged = h.staged.len();
        self.inner.durable.write().extend(h.staged);
        tracing::debug!(handle = %handle, staged, "commit");
        Ok(())
    }

    fn rollback(&self, handle: HandleId) -> Result<()> {
        let h = self.inner.open.lock()
            .remove(&handle)
            .ok_or(Error::HandleClosed(handle))?;
        tracing::debug!(handle = %handle, discarded = h.staged.len(), "rollback");
        Ok(())
    }

    fn read_committed(&self, predicate: &Predicate) -> Vec<Record> {
        self.inner.durable.read()
            .iter()
            .filter(|e| predicate.matches(&e.record))
            .map(|e| e.record.clone())
            .collect()
    }

    fn committed_entries(&self) -> Vec<StoredRecord> {
        self.inner.durable.read().clone()
    }
}

// ============================================================================
// Tests
// ============================================================================
