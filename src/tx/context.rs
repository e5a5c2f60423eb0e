//! One logical transaction frame.

use serde::{Deserialize, Serialize};
use crate::storage::HandleId;
use super::{ContextId, ContextState, Propagation};

/// How a context relates to a physical handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resource {
    /// No handle of its own (`Propagation::None`).
    None,
    /// Created the handle; commits or rolls it back on close.
    Owned(HandleId),
    /// Shares `owner`'s handle and never touches it directly.
    Borrowed { handle: HandleId, owner: ContextId },
}

/// A logical transaction frame.
///
/// The rollback-only flag is monotonic: once set it stays set until the
/// frame is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxContext {
    pub(crate) id: ContextId,
    pub(crate) propagation: Propagation,
    pub(crate) resource: Resource,
    pub(crate) parent: Option<ContextId>,
    pub(crate) rollback_only: bool,
}

impl TxContext {
    pub(crate) fn new(
        id: ContextId,
        propagation: Propagation,
        resource: Resource,
        parent: Option<ContextId>,
    ) -> Self {
        Self { id, propagation, resource, parent, rollback_only: false }
    }

    pub fn id(&self) -> ContextId { self.id }
    pub fn propagation(&self) -> Propagation { self.propagation }
    pub fn resource(&self) -> Resource { self.resource }
    pub fn parent(&self) -> Option<ContextId> { self.parent }
    pub fn is_rollback_only(&self) -> bool { self.rollback_only }

    pub fn owns_handle(&self) -> bool {
        matches!(self.resource, Resource::Owned(_))
    }

    /// The handle this frame itself carries, owned or borrowed.
    pub fn handle(&self) -> Option<HandleId> {
        match self.resource {
            Resource::None => None,
            Resource::Owned(h) | Resource::Borrowed { handle: h, .. } => Some(h),
        }
    }

    pub fn state(&self) -> ContextState {
        if self.rollback_only {
            ContextState::MarkedRollback
        } else {
            ContextState::Active
        }
    }

    pub(crate) fn mark(&mut self) {
        self.rollback_only = true;
    }
}
