//! Explicit per-invocation context stack.
//!
//! One `TxStack` belongs to one top-level invocation and is threaded
//! through every nested call. Frames are pushed on open and popped on close,
//! strictly LIFO; parent links always point further down the stack.

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::storage::HandleId;
use crate::{Error, Result};
use super::{ContextId, ContextState, Resource, TxContext};

#[derive(Debug, Default)]
pub struct TxStack {
    frames: SmallVec<[TxContext; 4]>,
    /// Final state of every frame closed on this stack.
    closed: HashMap<ContextId, ContextState>,
}

impl TxStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn innermost(&self) -> Option<&TxContext> {
        self.frames.last()
    }

    pub fn get(&self, id: ContextId) -> Option<&TxContext> {
        self.frames.iter().rev().find(|c| c.id == id)
    }

    fn get_mut(&mut self, id: ContextId) -> Option<&mut TxContext> {
        self.frames.iter_mut().rev().find(|c| c.id == id)
    }

    /// Open frames, outermost first.
    pub fn frames(&self) -> impl Iterator<Item = &TxContext> {
        self.frames.iter()
    }

    /// Current state of a frame, open or closed.
    pub fn state(&self, id: ContextId) -> Option<ContextState> {
        self.get(id)
            .map(TxContext::state)
            .or_else(|| self.closed.get(&id).copied())
    }

    /// Fails unless `id` is open on this stack.
    pub(crate) fn check_open(&self, id: ContextId) -> Result<&TxContext> {
        if let Some(frame) = self.get(id) {
            return Ok(frame);
        }
        if self.closed.contains_key(&id) {
            Err(Error::ContextClosed(id))
        } else {
            Err(Error::UnknownContext(id))
        }
    }

    /// Fails unless `id` is open and on top of the stack.
    pub(crate) fn check_innermost(&self, id: ContextId) -> Result<&TxContext> {
        let frame = self.check_open(id)?;
        match self.frames.last() {
            Some(top) if top.id == id => Ok(frame),
            Some(top) => Err(Error::ContextOutOfOrder { id, innermost: top.id }),
            None => Err(Error::UnknownContext(id)),
        }
    }

    pub(crate) fn push(&mut self, frame: TxContext) {
        self.frames.push(frame);
    }

    pub(crate) fn pop(&mut self) -> Option<TxContext> {
        self.frames.pop()
    }

    pub(crate) fn record_closed(&mut self, id: ContextId, state: ContextState) {
        debug_assert!(state.is_closed(), "{id} recorded as closed in state {state:?}");
        self.closed.insert(id, state);
    }

    /// Handle visible from `from` and the context that owns it.
    ///
    /// Walks parent links through frames that carry no handle of their own.
    pub fn enclosing_handle(&self, from: Option<ContextId>) -> Option<(HandleId, ContextId)> {
        let mut cursor = from;
        while let Some(id) = cursor {
            let frame = self.get(id)?;
            match frame.resource {
                Resource::Owned(handle) => return Some((handle, frame.id)),
                Resource::Borrowed { handle, owner } => return Some((handle, owner)),
                Resource::None => cursor = frame.parent,
            }
        }
        None
    }

    /// Set the rollback-only mark on `id` and on every ancestor up to and
    /// including the owner of the handle it uses.
    pub(crate) fn mark_rollback_only(&mut self, id: ContextId) -> Result<()> {
        self.check_open(id)?;
        let mut cursor = Some(id);
        while let Some(cid) = cursor {
            let Some(frame) = self.get_mut(cid) else { break };
            frame.mark();
            if frame.owns_handle() {
                break;
            }
            cursor = frame.parent;
        }
        Ok(())
    }

    /// Whether the handle `id` works through is doomed.
    pub fn is_rollback_only(&self, id: ContextId) -> bool {
        let mut cursor = Some(id);
        while let Some(cid) = cursor {
            let Some(frame) = self.get(cid) else { return false };
            if frame.rollback_only {
                return true;
            }
            if frame.owns_handle() {
                return false;
            }
            cursor = frame.parent;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::Propagation;

    fn frame(id: u64, resource: Resource, parent: Option<u64>) -> TxContext {
        TxContext::new(ContextId(id), Propagation::Required, resource, parent.map(ContextId))
    }

    #[test]
    fn test_enclosing_handle_skips_none_frames() {
        let mut stack = TxStack::new();
        stack.push(frame(1, Resource::Owned(HandleId(7)), None));
        stack.push(frame(2, Resource::None, Some(1)));

        assert_eq!(stack.enclosing_handle(Some(ContextId(2))), Some((HandleId(7), ContextId(1))));
        assert_eq!(stack.enclosing_handle(None), None);
    }

    #[test]
    fn test_mark_stops_at_owner() {
        let mut stack = TxStack::new();
        stack.push(frame(1, Resource::Owned(HandleId(1)), None));
        stack.push(frame(2, Resource::Owned(HandleId(2)), Some(1)));
        stack.push(frame(3, Resource::Borrowed { handle: HandleId(2), owner: ContextId(2) }, Some(2)));

        stack.mark_rollback_only(ContextId(3)).unwrap();

        assert_eq!(stack.state(ContextId(3)), Some(ContextState::MarkedRollback));
        assert_eq!(stack.state(ContextId(2)), Some(ContextState::MarkedRollback));
        assert_eq!(stack.state(ContextId(1)), Some(ContextState::Active));
        assert!(!stack.is_rollback_only(ContextId(1)));
    }

    #[test]
    fn test_closed_and_unknown_contexts() {
        let mut stack = TxStack::new();
        stack.record_closed(ContextId(4), ContextState::Committed);

        assert!(matches!(stack.check_open(ContextId(4)), Err(Error::ContextClosed(_))));
        assert!(matches!(stack.check_open(ContextId(5)), Err(Error::UnknownContext(_))));
    }
}
