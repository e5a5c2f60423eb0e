//! Transaction management.
//!
//! Logical transactions are [`TxContext`] frames on an explicit [`TxStack`].
//! The [`Coordinator`] decides, per frame, whether it shares the enclosing
//! physical handle or opens its own, and what happens to that handle when
//! the frame closes.

pub mod context;
pub mod stack;
pub mod coordinator;
pub mod scope;

use serde::{Deserialize, Serialize};

pub use context::{Resource, TxContext};
pub use stack::TxStack;
pub use coordinator::Coordinator;
pub use scope::TxScope;

/// Propagation mode declared by whoever opens a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Propagation {
    /// No demarcation: run inside whatever handle encloses the call, if any.
    None,
    /// Join the enclosing handle, or open one when there is none.
    #[default]
    Required,
    /// Always open a separate handle.
    RequiresNew,
}

/// How the body of a context finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Normal,
    Failed,
}

/// Lifecycle of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextState {
    Active,
    MarkedRollback,
    /// Owner closed and its handle committed.
    Committed,
    /// Owner closed and its handle rolled back.
    RolledBack,
    /// Closed without owning a handle (borrower or `None` frame).
    Released,
}

impl ContextState {
    pub fn is_closed(self) -> bool {
        matches!(self, ContextState::Committed | ContextState::RolledBack | ContextState::Released)
    }
}

/// Opaque context identifier, unique per coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContextId(pub u64);

impl std::fmt::Display for ContextId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tx{}", self.0)
    }
}
