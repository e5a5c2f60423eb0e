//! Member writes.

use crate::model::{Member, Predicate, Record, RecordId};
use crate::storage::ResourceManager;
use crate::tx::{Propagation, TxScope};
use crate::{Error, Result};

/// Writes and looks up [`Member`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberRepository {
    propagation: Propagation,
}

impl MemberRepository {
    pub fn new(propagation: Propagation) -> Self {
        Self { propagation }
    }

    pub fn propagation(&self) -> Propagation {
        self.propagation
    }

    /// Stage `member` in a context opened with this repository's
    /// propagation. A blank username is rejected after the write.
    pub fn save<R: ResourceManager>(&self, scope: &mut TxScope<'_, R>, member: &Member) -> Result<RecordId> {
        scope.run(self.propagation, |tx| {
            tracing::info!(username = %member.username, context = %tx.context_id(), "saving member");
            let id = tx.write(member.clone().into())?;

            if member.username.trim().is_empty() {
                return Err(Error::DomainRejected("member username must not be blank".into()));
            }
            Ok(id)
        })
    }

    /// The member visible from `scope`. Not transactional on its own.
    pub fn find<R: ResourceManager>(&self, scope: &TxScope<'_, R>, username: &str) -> Result<Option<Member>> {
        let found = scope.read(&Predicate::member_named(username))?;
        Ok(found.iter().find_map(Record::as_member).cloned())
    }
}
