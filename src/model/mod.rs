//! # Record Model
//!
//! The two record types written by the join workflow, plus the predicate
//! used to read them back. Pure data: no I/O, no state.

pub mod member;
pub mod log;
pub mod record;
pub mod predicate;

pub use member::Member;
pub use log::LogEntry;
pub use record::{Record, RecordId, RecordKind};
pub use predicate::Predicate;
