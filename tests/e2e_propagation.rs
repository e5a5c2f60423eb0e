//! End-to-end tests for the join workflow under each propagation layout.
//!
//! Each test runs `MemberService::join_v1` / `join_v2` against a fresh
//! `MemoryStore` and then checks, outside any transaction, which of the two
//! writes became durable.

use std::sync::Arc;

use tx_propagation::service::LOG_FAILURE_MARKER;
use tx_propagation::{
    Coordinator, Error, JoinConfig, MemberService, MemoryStore, Predicate, Propagation, ResourceManager,
};

fn service(config: JoinConfig) -> MemberService<MemoryStore> {
    MemberService::new(Arc::new(Coordinator::new(MemoryStore::new())), config)
}

fn failing(name: &str) -> String {
    format!("{LOG_FAILURE_MARKER}_{name}")
}

fn member_saved(svc: &MemberService<MemoryStore>, username: &str) -> bool {
    svc.find_member(username).unwrap().is_some()
}

fn log_saved(svc: &MemberService<MemoryStore>, message: &str) -> bool {
    svc.find_log(message).unwrap().is_some()
}

// ============================================================================
// 1. Service off, repositories on: each write is its own transaction
// ============================================================================

#[test]
fn test_outer_tx_off_success() {
    let svc = service(JoinConfig::outer_off());
    let username = "outer_tx_off_success";

    svc.join_v1(username).unwrap();

    assert!(member_saved(&svc, username));
    assert!(log_saved(&svc, username));
}

#[test]
fn test_outer_tx_off_fail_keeps_member() {
    let svc = service(JoinConfig::outer_off());
    let username = failing("outer_tx_off_fail");

    let err = svc.join_v1(&username).unwrap_err();
    assert!(matches!(err, Error::DomainRejected(_)));

    // Member committed in its own transaction, log rolled back in its own.
    assert!(member_saved(&svc, &username));
    assert!(!log_saved(&svc, &username));
}

// ============================================================================
// 2. Only the service demarcates: one atomic unit
// ============================================================================

#[test]
fn test_single_tx_success() {
    let svc = service(JoinConfig::single_tx());
    let username = "single_tx_success";

    svc.join_v1(username).unwrap();

    assert!(member_saved(&svc, username));
    assert!(log_saved(&svc, username));
}

#[test]
fn test_single_tx_fail_rolls_back_both() {
    let svc = service(JoinConfig::single_tx());
    let username = failing("single_tx_fail");

    let err = svc.join_v1(&username).unwrap_err();
    assert!(matches!(err, Error::DomainRejected(_)));

    assert!(!member_saved(&svc, &username));
    assert!(!log_saved(&svc, &username));
}

// ============================================================================
// 3. Every layer Required: repositories join the service's handle
// ============================================================================

#[test]
fn test_outer_tx_on_success() {
    let svc = service(JoinConfig::outer_on());
    let username = "outer_tx_on_success";

    svc.join_v1(username).unwrap();

    assert!(member_saved(&svc, username));
    assert!(log_saved(&svc, username));
    assert_eq!(svc.coordinator().resources().open_handles(), 0);
}

#[test]
fn test_outer_tx_on_fail_rolls_back_both() {
    let svc = service(JoinConfig::outer_on());
    let username = failing("outer_tx_on_fail");

    let err = svc.join_v1(&username).unwrap_err();
    assert!(matches!(err, Error::DomainRejected(_)));

    assert!(!member_saved(&svc, &username));
    assert!(!log_saved(&svc, &username));
}

// ============================================================================
// 4. Recovering from a shared-handle failure still rolls everything back
// ============================================================================

#[test]
fn test_recover_exception_fail() {
    let svc = service(JoinConfig::outer_on());
    let username = failing("recover_exception_fail");

    // The service swallowed the DomainRejected; the coordinator must still
    // refuse to commit.
    let err = svc.join_v2(&username).unwrap_err();
    assert!(matches!(err, Error::UnexpectedRollback { .. }), "got {err:?}");

    assert!(!member_saved(&svc, &username));
    assert!(!log_saved(&svc, &username));
    assert_eq!(svc.coordinator().resources().open_handles(), 0);
}

// ============================================================================
// 5. RequiresNew isolates the log write: recovery lets the member commit
// ============================================================================

#[test]
fn test_recover_exception_success() {
    let svc = service(JoinConfig::isolated_log());
    let username = failing("recover_exception_success");

    svc.join_v2(&username).unwrap();

    assert!(member_saved(&svc, &username));
    assert!(!log_saved(&svc, &username));
}

#[test]
fn test_isolated_log_without_recovery_rolls_back_member() {
    let svc = service(JoinConfig::isolated_log());
    let username = failing("isolated_no_recovery");

    let err = svc.join_v1(&username).unwrap_err();
    assert!(matches!(err, Error::DomainRejected(_)));

    // The failure reached the service boundary and rolled back its handle.
    assert!(!member_saved(&svc, &username));
    assert!(!log_saved(&svc, &username));
}

// ============================================================================
// 6. No demarcation anywhere: each write auto-commits
// ============================================================================

#[test]
fn test_all_none_writes_autocommit() {
    let config = JoinConfig {
        service: Propagation::None,
        member: Propagation::None,
        log: Propagation::None,
    };
    let svc = service(config);
    let username = failing("all_none");

    let err = svc.join_v1(&username).unwrap_err();
    assert!(matches!(err, Error::DomainRejected(_)));

    // Nothing could roll the writes back.
    assert!(member_saved(&svc, &username));
    assert!(log_saved(&svc, &username));
}

#[test]
fn test_recovery_under_outer_off_succeeds() {
    let svc = service(JoinConfig::outer_off());
    let username = failing("outer_off_recover");

    svc.join_v2(&username).unwrap();

    assert!(member_saved(&svc, &username));
    assert!(!log_saved(&svc, &username));
}

#[test]
fn test_blank_username_rolls_back_whole_join() {
    let svc = service(JoinConfig::outer_on());

    let err = svc.join_v1("  ").unwrap_err();
    assert!(matches!(err, Error::DomainRejected(ref m) if m == "member username must not be blank"));

    // The log write never ran; the member write was rolled back with the
    // service's handle.
    let store = svc.coordinator().resources();
    assert!(store.read_committed(&Predicate::All).is_empty());
    assert_eq!(store.open_handles(), 0);
}

#[test]
fn test_custom_marker() {
    let svc = service(JoinConfig::outer_on()).with_log_marker("REJECT");

    // The default marker is no longer special.
    let plain = failing("custom_marker");
    svc.join_v1(&plain).unwrap();
    assert!(log_saved(&svc, &plain));

    assert!(svc.join_v1("REJECT me").is_err());
    assert!(!member_saved(&svc, "REJECT me"));
}

#[test]
fn test_durable_state_matches_lookups() {
    let svc = service(JoinConfig::isolated_log());
    svc.join_v1("ada").unwrap();
    svc.join_v2(&failing("bob")).unwrap();

    let store = svc.coordinator().resources();
    assert_eq!(store.read_committed(&Predicate::All).len(), 3);
    assert_eq!(store.read_committed(&Predicate::member_named(failing("bob"))).len(), 1);
    assert!(store.read_committed(&Predicate::log_message(failing("bob"))).is_empty());
}
