//! The join workflow.

use std::sync::Arc;

use crate::model::{LogEntry, Member};
use crate::storage::ResourceManager;
use crate::tx::{Coordinator, Propagation};
use crate::Result;
use super::{JoinConfig, LogRepository, MemberRepository};

/// Joins a member: one member write followed by one log write, each through
/// its own repository.
pub struct MemberService<R: ResourceManager> {
    coordinator: Arc<Coordinator<R>>,
    config: JoinConfig,
    members: MemberRepository,
    logs: LogRepository,
}

impl<R: ResourceManager> MemberService<R> {
    pub fn new(coordinator: Arc<Coordinator<R>>, config: JoinConfig) -> Self {
        Self {
            coordinator,
            config,
            members: MemberRepository::new(config.member),
            logs: LogRepository::new(config.log),
        }
    }

    /// Replace the log repository's failure marker.
    pub fn with_log_marker(mut self, marker: impl Into<String>) -> Self {
        self.logs = LogRepository::with_marker(self.config.log, marker);
        self
    }

    pub fn config(&self) -> &JoinConfig {
        &self.config
    }

    pub fn coordinator(&self) -> &Coordinator<R> {
        &self.coordinator
    }

    /// Save the member, then a log entry named after it. Any failure fails
    /// the whole call.
    pub fn join_v1(&self, username: &str) -> Result<()> {
        self.coordinator.run(self.config.service, |scope| {
            self.members.save(scope, &Member::new(username))?;
            self.logs.save(scope, &LogEntry::new(username))?;
            Ok(())
        })
    }

    /// Like [`join_v1`](Self::join_v1), but a rejected or rolled-back log
    /// write is swallowed and the member write carries on.
    ///
    /// Swallowing the error does not clear a rollback mark the log write
    /// left on a shared handle: with a `Required` log repository inside a
    /// `Required` service this still ends in `Error::UnexpectedRollback`.
    pub fn join_v2(&self, username: &str) -> Result<()> {
        self.coordinator.run(self.config.service, |scope| {
            self.members.save(scope, &Member::new(username))?;

            if let Err(err) = self.logs.save(scope, &LogEntry::new(username)) {
                if !err.is_recoverable() {
                    return Err(err);
                }
                tracing::info!(username, error = %err, "log write failed, continuing");
            }
            Ok(())
        })
    }

    /// Durable member lookup, outside any transaction.
    pub fn find_member(&self, username: &str) -> Result<Option<Member>> {
        self.coordinator
            .run(Propagation::None, |scope| self.members.find(scope, username))
    }

    /// Durable log lookup, outside any transaction.
    pub fn find_log(&self, message: &str) -> Result<Option<LogEntry>> {
        self.coordinator
            .run(Propagation::None, |scope| self.logs.find(scope, message))
    }
}
