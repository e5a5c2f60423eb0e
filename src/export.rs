//! JSON export of durable state.
//!
//! Dumps every committed record, with the id it was written under, as one
//! JSON document:
//!
//! ```text
//! {"records": [{"id": 1, "record": {"kind": "Member", "data": {...}}}, ...]}
//! ```
//!
//! Staged records on open handles are never exported.

use std::io::Write;
use serde::Serialize;

use crate::storage::{ResourceManager, StoredRecord};
use crate::Result;

#[derive(Serialize)]
struct Dump<'a> {
    records: &'a [StoredRecord],
}

/// Write the durable records of `resources` to `writer` as pretty JSON.
pub fn export_json<R: ResourceManager>(resources: &R, writer: &mut dyn Write) -> Result<()> {
    let records = resources.committed_entries();
    serde_json::to_writer_pretty(&mut *writer, &Dump { records: &records })?;
    writeln!(writer)?;
    Ok(())
}

/// Same as [`export_json`], into a `String`.
pub fn export_json_string<R: ResourceManager>(resources: &R) -> Result<String> {
    let records = resources.committed_entries();
    Ok(serde_json::to_string_pretty(&Dump { records: &records })?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Record;
    use crate::storage::MemoryStore;

    #[test]
    fn test_export_only_durable() {
        let store = MemoryStore::new();
        let committed = store.begin().unwrap();
        store.write(committed, Record::member("ada")).unwrap();
        store.commit(committed).unwrap();

        let pending = store.begin().unwrap();
        store.write(pending, Record::member("bob")).unwrap();

        let json = export_json_string(&store).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let records = value["records"].as_array().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["record"]["kind"], "Member");
        assert_eq!(records[0]["record"]["data"]["username"], "ada");
    }

    #[test]
    fn test_export_to_writer() {
        let store = MemoryStore::new();
        let mut out = Vec::new();
        export_json(&store, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"records\": []"));
        assert!(text.ends_with('\n'));
    }
}
