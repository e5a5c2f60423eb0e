//! Member record.

use serde::{Deserialize, Serialize};

/// A member who joined through the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Member {
    pub username: String,
}

impl Member {
    pub fn new(username: impl Into<String>) -> Self {
        Self { username: username.into() }
    }
}
