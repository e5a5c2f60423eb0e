//! Record envelope stored by resource handles.

use serde::{Deserialize, Serialize};
use super::{LogEntry, Member};

/// Store-wide record identifier, assigned at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discriminant of a [`Record`], usable without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    Member,
    Log,
}

/// Anything a resource handle can stage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub enum Record {
    Member(Member),
    Log(LogEntry),
}

impl Record {
    pub fn member(username: impl Into<String>) -> Self {
        Record::Member(Member::new(username))
    }

    pub fn log(message: impl Into<String>) -> Self {
        Record::Log(LogEntry::new(message))
    }

    pub fn kind(&self) -> RecordKind {
        match self {
            Record::Member(_) => RecordKind::Member,
            Record::Log(_) => RecordKind::Log,
        }
    }

    /// The natural lookup key: username for members, message for log entries.
    pub fn key(&self) -> &str {
        match self {
            Record::Member(m) => &m.username,
            Record::Log(l) => &l.message,
        }
    }

    pub fn as_member(&self) -> Option<&Member> {
        match self {
            Record::Member(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_log(&self) -> Option<&LogEntry> {
        match self {
            Record::Log(l) => Some(l),
            _ => None,
        }
    }
}

impl From<Member> for Record {
    fn from(m: Member) -> Self {
        Record::Member(m)
    }
}

impl From<LogEntry> for Record {
    fn from(l: LogEntry) -> Self {
        Record::Log(l)
    }
}
