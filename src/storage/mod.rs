//! # Resource Manager Trait
//!
//! This is the contract between the coordinator and the store that holds
//! the records. The coordinator only ever asks for five things: begin a
//! handle, write through it, read through it, commit it, roll it back.
//!
//! ## Implementations
//!
//! | Backend | Module | Description |
//! |---------|--------|-------------|
//! | `MemoryStore` | `memory` | Snapshot-isolated in-memory store |

pub mod memory;

use serde::{Deserialize, Serialize};
use crate::model::{Predicate, Record, RecordId};
use crate::Result;

pub use memory::MemoryStore;

// ============================================================================
// Handle identity
// ============================================================================

/// Opaque identifier of one physical resource handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(pub u64);

impl std::fmt::Display for HandleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "h{}", self.0)
    }
}

// ============================================================================
// Store configuration
// ============================================================================

/// Configuration for a store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Upper bound on simultaneously open handles. `begin()` fails with
    /// `ResourceUnavailable` past it; it never waits.
    pub max_open_handles: Option<usize>,
}

impl StoreConfig {
    pub fn bounded(max_open_handles: usize) -> Self {
        Self { max_open_handles: Some(max_open_handles) }
    }
}

// ============================================================================
// Durable entry
// ============================================================================

/// A committed record together with the id it was written under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub record: Record,
}

// ============================================================================
// ResourceManager Trait
// ============================================================================

/// The resource interface consumed by the coordinator.
///
/// Handles are isolated: a handle sees what was durable when it began plus
/// its own staged writes. Every operation on a handle that has already been
/// committed or rolled back fails with `Error::HandleClosed`.
pub trait ResourceManager: Send + Sync + 'static {
    /// Allocate a new handle.
    fn begin(&self) -> Result<HandleId>;

    /// Stage a record on an open handle.
    fn write(&self, handle: HandleId, record: Record) -> Result<RecordId>;

    /// Records visible to `handle` that satisfy `predicate`, in write order.
    fn read(&self, handle: HandleId, predicate: &Predicate) -> Result<Vec<Record>>;

    /// Make staged records durable and close the handle.
    fn commit(&self, handle: HandleId) -> Result<()>;

    /// Discard staged records and close the handle.
    fn rollback(&self, handle: HandleId) -> Result<()>;

    /// Durable records matching `predicate`, read outside any handle.
    fn read_committed(&self, predicate: &Predicate) -> Vec<Record>;

    /// Every durable record with its id, in commit order.
    fn committed_entries(&self) -> Vec<StoredRecord>;
}
