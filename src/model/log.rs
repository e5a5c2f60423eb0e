//! Audit log record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit line written next to a member join.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogEntry {
    pub message: String,
    pub logged_at: DateTime<Utc>,
}

impl LogEntry {
    /// Entry stamped with the current time.
    pub fn new(message: impl Into<String>) -> Self {
        Self::at(message, Utc::now())
    }

    pub fn at(message: impl Into<String>, logged_at: DateTime<Utc>) -> Self {
        Self {
            message: message.into(),
            logged_at,
        }
    }

    pub fn contains(&self, marker: &str) -> bool {
        self.message.contains(marker)
    }
}
