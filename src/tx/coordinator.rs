//! The transaction coordinator.
//!
//! Implements the propagation rules on `open`, rollback-only escalation on
//! `mark_rollback_only`, and the commit / rollback / reject decision on
//! `close`. Physical handles are only ever touched by the frame that owns
//! them.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::storage::ResourceManager;
use crate::{Error, Result};
use super::{ContextId, ContextState, Outcome, Propagation, Resource, TxContext, TxScope, TxStack};

/// Coordinates nested logical transactions over one resource manager.
///
/// The coordinator itself holds no per-invocation state: every call takes
/// the caller's [`TxStack`], so one coordinator can serve any number of
/// concurrent invocations.
pub struct Coordinator<R: ResourceManager> {
    resources: R,
    next_context_id: AtomicU64,
}

impl<R: ResourceManager> Coordinator<R> {
    pub fn new(resources: R) -> Self {
        Self {
            resources,
            next_context_id: AtomicU64::new(1),
        }
    }

    /// Access the underlying resource manager.
    pub fn resources(&self) -> &R {
        &self.resources
    }

    // ========================================================================
    // Closure surface
    // ========================================================================

    /// Run `f` as a top-level invocation inside a context opened with
    /// `propagation`, on a fresh stack.
    ///
    /// The context is closed with `Outcome::Normal` when `f` returns `Ok`
    /// and `Outcome::Failed` otherwise. A failure from `f` is returned
    /// unchanged after the context has been cleaned up.
    pub fn run<T, F>(&self, propagation: Propagation, f: F) -> Result<T>
    where
        F: FnOnce(&mut TxScope<'_, R>) -> Result<T>,
    {
        let mut stack = TxStack::new();
        self.run_in(&mut stack, propagation, f)
    }

    /// Run `f` in a context pushed onto an existing stack.
    pub fn run_in<T, F>(&self, stack: &mut TxStack, propagation: Propagation, f: F) -> Result<T>
    where
        F: FnOnce(&mut TxScope<'_, R>) -> Result<T>,
    {
        let id = self.open(stack, propagation)?;

        let result = {
            let mut scope = TxScope::new(self, &mut *stack, id, propagation);
            f(&mut scope)
        };

        match result {
            Ok(value) => {
                self.close(stack, id, Outcome::Normal)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(cleanup) = self.close(stack, id, Outcome::Failed) {
                    tracing::error!(context = %id, error = %cleanup, "cleanup after failure did not complete");
                }
                Err(err)
            }
        }
    }

    // ========================================================================
    // Stack protocol
    // ========================================================================

    /// Push a new context on `stack`, deciding whether it shares the
    /// enclosing handle or opens its own.
    pub fn open(&self, stack: &mut TxStack, propagation: Propagation) -> Result<ContextId> {
        let parent = stack.innermost().map(TxContext::id);

        let resource = match propagation {
            Propagation::None => Resource::None,
            Propagation::Required => match stack.enclosing_handle(parent) {
                Some((handle, owner)) => Resource::Borrowed { handle, owner },
                None => Resource::Owned(self.resources.begin()?),
            },
            Propagation::RequiresNew => Resource::Owned(self.resources.begin()?),
        };

        let id = ContextId(self.next_context_id.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(context = %id, ?propagation, ?resource, parent = ?parent, "open");
        stack.push(TxContext::new(id, propagation, resource, parent));
        Ok(id)
    }

    /// Mark `id` rollback-only, escalating to the owner of its handle.
    pub fn mark_rollback_only(&self, stack: &mut TxStack, id: ContextId) -> Result<()> {
        stack.mark_rollback_only(id)?;
        tracing::debug!(context = %id, "marked rollback-only");
        Ok(())
    }

    /// Close the innermost context.
    ///
    /// - Borrowers and `None` frames are popped without touching a handle;
    ///   a borrower closing with `Outcome::Failed` marks its owner first.
    /// - Owners roll back on `Outcome::Failed`, and commit on
    ///   `Outcome::Normal` unless marked, in which case the handle is rolled
    ///   back and `Error::UnexpectedRollback` is returned.
    ///
    /// Closing twice yields `Error::ContextClosed`; closing a frame that is
    /// not innermost yields `Error::ContextOutOfOrder`.
    pub fn close(&self, stack: &mut TxStack, id: ContextId, outcome: Outcome) -> Result<ContextState> {
        let resource = stack.check_innermost(id)?.resource();

        let handle = match resource {
            Resource::Owned(handle) => handle,
            Resource::Borrowed { .. } => {
                if outcome == Outcome::Failed {
                    stack.mark_rollback_only(id)?;
                }
                return Ok(self.release(stack, id, outcome));
            }
            Resource::None => return Ok(self.release(stack, id, outcome)),
        };

        let frame = stack.pop().ok_or(Error::UnknownContext(id))?;

        let physical = match outcome {
            Outcome::Failed => self.resources.rollback(handle).map(|_| ContextState::RolledBack),
            Outcome::Normal if frame.is_rollback_only() => {
                tracing::warn!(context = %id, handle = %handle, "commit rejected: marked rollback-only");
                if let Err(cleanup) = self.resources.rollback(handle) {
                    tracing::error!(context = %id, handle = %handle, error = %cleanup, "rollback of rejected commit did not complete");
                }
                Err(Error::UnexpectedRollback { context: id })
            }
            Outcome::Normal => self.resources.commit(handle).map(|_| ContextState::Committed),
        };

        let state = match &physical {
            Ok(state) => *state,
            Err(_) => ContextState::RolledBack,
        };
        stack.record_closed(id, state);
        tracing::debug!(context = %id, ?outcome, ?state, "close");
        physical
    }

    fn release(&self, stack: &mut TxStack, id: ContextId, outcome: Outcome) -> ContextState {
        stack.pop();
        stack.record_closed(id, ContextState::Released);
        tracing::debug!(context = %id, ?outcome, "release");
        ContextState::Released
    }
}

impl<R: ResourceManager + std::fmt::Debug> std::fmt::Debug for Coordinator<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("resources", &self.resources)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
