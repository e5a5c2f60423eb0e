//! Context token handed to transactional closures.

use crate::model::{Predicate, Record, RecordId};
use crate::storage::{HandleId, ResourceManager};
use crate::Result;
use super::{ContextId, Coordinator, Propagation, TxStack};

/// The caller's view of one open context.
///
/// A scope borrows the stack it lives on, so it cannot outlive the call
/// that created it. Nested work goes through [`TxScope::run`].
pub struct TxScope<'a, R: ResourceManager> {
    coordinator: &'a Coordinator<R>,
    stack: &'a mut TxStack,
    id: ContextId,
    propagation: Propagation,
}

impl<'a, R: ResourceManager> TxScope<'a, R> {
    pub(crate) fn new(
        coordinator: &'a Coordinator<R>,
        stack: &'a mut TxStack,
        id: ContextId,
        propagation: Propagation,
    ) -> Self {
        Self { coordinator, stack, id, propagation }
    }

    pub fn context_id(&self) -> ContextId {
        self.id
    }

    pub fn propagation(&self) -> Propagation {
        self.propagation
    }

    /// Number of open contexts on this invocation's stack, this one included.
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    /// The handle work in this scope goes through, if any.
    pub fn handle(&self) -> Option<HandleId> {
        self.stack.enclosing_handle(Some(self.id)).map(|(handle, _)| handle)
    }

    pub fn has_transaction(&self) -> bool {
        self.handle().is_some()
    }

    pub fn is_rollback_only(&self) -> bool {
        self.stack.is_rollback_only(self.id)
    }

    /// Doom the handle this scope works through without failing the call.
    pub fn set_rollback_only(&mut self) -> Result<()> {
        self.coordinator.mark_rollback_only(self.stack, self.id)
    }

    /// Stage `record` on the current handle. Without one the write is
    /// committed on its own.
    pub fn write(&mut self, record: Record) -> Result<RecordId> {
        let resources = self.coordinator.resources();
        if let Some(handle) = self.handle() {
            return resources.write(handle, record);
        }

        let handle = resources.begin()?;
        tracing::debug!(context = %self.id, handle = %handle, "auto-commit write");
        match resources.write(handle, record) {
            Ok(id) => {
                resources.commit(handle)?;
                Ok(id)
            }
            Err(err) => {
                if let Err(cleanup) = resources.rollback(handle) {
                    tracing::error!(handle = %handle, error = %cleanup, "auto-commit rollback failed");
                }
                Err(err)
            }
        }
    }

    /// Records visible from this scope. Without a handle only durable
    /// records are visible.
    pub fn read(&self, predicate: &Predicate) -> Result<Vec<Record>> {
        let resources = self.coordinator.resources();
        match self.handle() {
            Some(handle) => resources.read(handle, predicate),
            None => Ok(resources.read_committed(predicate)),
        }
    }

    /// Run `f` in a nested context.
    pub fn run<T, F>(&mut self, propagation: Propagation, f: F) -> Result<T>
    where
        F: FnOnce(&mut TxScope<'_, R>) -> Result<T>,
    {
        self.coordinator.run_in(self.stack, propagation, f)
    }
}
