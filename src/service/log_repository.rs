//! Log writes.

use crate::model::{LogEntry, Predicate, Record, RecordId};
use crate::storage::ResourceManager;
use crate::tx::{Propagation, TxScope};
use crate::{Error, Result};

/// Messages containing this marker are rejected by [`LogRepository::save`].
pub const LOG_FAILURE_MARKER: &str = "로그예외";

/// Writes and looks up [`LogEntry`] records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRepository {
    propagation: Propagation,
    marker: String,
}

impl LogRepository {
    pub fn new(propagation: Propagation) -> Self {
        Self::with_marker(propagation, LOG_FAILURE_MARKER)
    }

    pub fn with_marker(propagation: Propagation, marker: impl Into<String>) -> Self {
        Self {
            propagation,
            marker: marker.into(),
        }
    }

    pub fn propagation(&self) -> Propagation {
        self.propagation
    }

    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// Stage `entry`, then reject it if its message carries the failure
    /// marker. The rejected write stays staged; what happens to it is up to
    /// whoever owns the handle.
    pub fn save<R: ResourceManager>(&self, scope: &mut TxScope<'_, R>, entry: &LogEntry) -> Result<RecordId> {
        scope.run(self.propagation, |tx| {
            tracing::info!(message = %entry.message, context = %tx.context_id(), "saving log");
            let id = tx.write(entry.clone().into())?;

            if entry.contains(&self.marker) {
                tracing::info!(message = %entry.message, "log rejected");
                return Err(Error::DomainRejected(format!(
                    "log message contains '{}'",
                    self.marker
                )));
            }
            Ok(id)
        })
    }

    pub fn find<R: ResourceManager>(&self, scope: &TxScope<'_, R>, message: &str) -> Result<Option<LogEntry>> {
        let found = scope.read(&Predicate::log_message(message))?;
        Ok(found.iter().find_map(Record::as_log).cloned())
    }
}
