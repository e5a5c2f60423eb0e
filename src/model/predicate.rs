//! Read predicates.

use serde::{Deserialize, Serialize};
use super::{Record, RecordKind};

/// Filter applied by `ResourceManager::read` and `read_committed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predicate {
    /// Every visible record.
    All,
    /// Every visible record of one kind.
    Kind(RecordKind),
    /// Records of one kind whose key (username / message) equals `key`.
    Key { kind: RecordKind, key: String },
}

impl Predicate {
    pub fn member_named(username: impl Into<String>) -> Self {
        Predicate::Key { kind: RecordKind::Member, key: username.into() }
    }

    pub fn log_message(message: impl Into<String>) -> Self {
        Predicate::Key { kind: RecordKind::Log, key: message.into() }
    }

    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Kind(kind) => record.kind() == *kind,
            Predicate::Key { kind, key } => record.kind() == *kind && record.key() == key.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_predicate_checks_kind() {
        let member = Record::member("ada");
        let log = Record::log("ada");

        assert!(Predicate::member_named("ada").matches(&member));
        assert!(!Predicate::member_named("ada").matches(&log));
        assert!(Predicate::log_message("ada").matches(&log));
    }

    #[test]
    fn test_kind_and_all() {
        let log = Record::log("x");
        assert!(Predicate::All.matches(&log));
        assert!(Predicate::Kind(RecordKind::Log).matches(&log));
        assert!(!Predicate::Kind(RecordKind::Member).matches(&log));
    }
}
