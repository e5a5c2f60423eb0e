//! # tx-propagation — Nested Transaction Coordination
//!
//! A small in-process transaction coordinator that maps nested *logical*
//! transactions onto *physical* resource handles.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `ResourceManager` is the contract between the
//!    coordinator and whatever holds the records
//! 2. **Explicit stack**: contexts live in a `TxStack` threaded through every
//!    call, never in a global or thread-local
//! 3. **Closed propagation set**: `Propagation` is an enum consumed by one
//!    `open` with an exhaustive match
//! 4. **Monotonic rollback mark**: borrowers funnel rollback intent up to the
//!    owner of the physical handle; only the owner commits or rolls back
//!
//! ## Quick Start
//!
//! ```rust
//! use tx_propagation::{Coordinator, MemoryStore, Propagation, Record};
//!
//! # fn example() -> tx_propagation::Result<()> {
//! let coordinator = Coordinator::new(MemoryStore::new());
//!
//! coordinator.run(Propagation::Required, |outer| {
//!     outer.write(Record::member("ada"))?;
//!     outer.run(Propagation::RequiresNew, |inner| {
//!         inner.write(Record::log("ada joined"))
//!     })?;
//!     Ok(())
//! })?;
//!
//! assert_eq!(coordinator.resources().durable_count(), 2);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Propagation
//!
//! | Mode | Enclosing handle present | No enclosing handle |
//! |------|--------------------------|---------------------|
//! | `None` | uses it, demarcates nothing | auto-commit per write |
//! | `Required` | borrows it | opens and owns a new one |
//! | `RequiresNew` | opens and owns a new one | opens and owns a new one |

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod tx;
pub mod service;
pub mod export;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{LogEntry, Member, Predicate, Record, RecordId, RecordKind};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{HandleId, MemoryStore, ResourceManager, StoreConfig};

// ============================================================================
// Re-exports: Transactions
// ============================================================================

pub use tx::{
    ContextId, ContextState, Coordinator, Outcome, Propagation, TxContext, TxScope, TxStack,
};

// ============================================================================
// Re-exports: Services
// ============================================================================

pub use service::{JoinConfig, LogRepository, MemberRepository, MemberService};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Resource unavailable: {0}")]
    ResourceUnavailable(String),

    #[error("Handle {0} is closed")]
    HandleClosed(HandleId),

    #[error("Domain rejected: {0}")]
    DomainRejected(String),

    #[error("Transaction {context} silently rolled back because it has been marked as rollback-only")]
    UnexpectedRollback { context: ContextId },

    #[error("Context {0} is already closed")]
    ContextClosed(ContextId),

    #[error("Context {id} is not the innermost open context (innermost: {innermost})")]
    ContextOutOfOrder { id: ContextId, innermost: ContextId },

    #[error("Unknown context: {0}")]
    UnknownContext(ContextId),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Use-after-close and out-of-order closes: always a bug in the caller.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Error::HandleClosed(_)
                | Error::ContextClosed(_)
                | Error::ContextOutOfOrder { .. }
                | Error::UnknownContext(_)
        )
    }

    /// Failures a workflow may catch and continue from.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::DomainRejected(_) | Error::UnexpectedRollback { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
