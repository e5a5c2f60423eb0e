//! Participating operations: the member / log repositories and the join
//! workflow that sequences them.
//!
//! Each repository method opens its own context under a declared
//! propagation mode, so the same workflow code behaves differently
//! depending only on [`JoinConfig`].

pub mod member_repository;
pub mod log_repository;
pub mod member_service;

use serde::{Deserialize, Serialize};
use crate::tx::Propagation;

pub use member_repository::MemberRepository;
pub use log_repository::{LogRepository, LOG_FAILURE_MARKER};
pub use member_service::MemberService;

/// Propagation declared at each layer of the join workflow.
///
/// `Default` is [`JoinConfig::outer_on`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinConfig {
    pub service: Propagation,
    pub member: Propagation,
    pub log: Propagation,
}

impl JoinConfig {
    /// Service demarcates nothing; each repository call is its own
    /// transaction.
    pub fn outer_off() -> Self {
        Self {
            service: Propagation::None,
            member: Propagation::Required,
            log: Propagation::Required,
        }
    }

    /// Only the service demarcates; repositories run inside it.
    pub fn single_tx() -> Self {
        Self {
            service: Propagation::Required,
            member: Propagation::None,
            log: Propagation::None,
        }
    }

    /// Every layer declares `Required`; repositories join the service's
    /// transaction.
    pub fn outer_on() -> Self {
        Self {
            service: Propagation::Required,
            member: Propagation::Required,
            log: Propagation::Required,
        }
    }

    /// Like [`outer_on`](Self::outer_on), but the log write gets its own
    /// physical handle.
    pub fn isolated_log() -> Self {
        Self {
            log: Propagation::RequiresNew,
            ..Self::outer_on()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_outer_on() {
        assert_eq!(JoinConfig::default(), JoinConfig::outer_on());
    }

    #[test]
    fn test_config_from_json() {
        let config: JoinConfig =
            serde_json::from_str(r#"{"service": "REQUIRED", "log": "REQUIRES_NEW"}"#).unwrap();
        assert_eq!(config, JoinConfig::isolated_log());

        let config: JoinConfig = serde_json::from_str(r#"{"service": "NONE"}"#).unwrap();
        assert_eq!(config, JoinConfig::outer_off());
    }
}
