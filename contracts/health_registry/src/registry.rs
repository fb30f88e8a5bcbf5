use alloc::string::String;
use alloc::vec::Vec;

use crate::errors::RegistryError;
use crate::ledger::Ledger;
use crate::record::{self, Record, RecordKind};

// ── Scan bounds ───────────────────────────────────────────────

/// First key covered by the patient range scan.
pub const PATIENT_SCAN_START: &str = "PATIENT0";
/// An empty end key leaves the scan open.
pub const SCAN_OPEN_END: &str = "";

// ── Seed fixtures ─────────────────────────────────────────────

/// Seeded patients are stored under `patient0`, `patient1`, ...
pub const SEED_KEY_PREFIX: &str = "patient";

/// `[firstName, secondName, age, address]` of each seeded patient.
pub const SEED_PATIENTS: [[&str; 4]; 2] = [
    ["Zaheer", "wasa", "22", "islamabad"],
    ["Khaliq", "Ab", "22", "islamabad"],
];

/// Registry operations over a ledger.
pub struct Registry<L> {
    ledger: L,
}

impl<L: Ledger> Registry<L> {
    pub fn new(ledger: L) -> Self {
        Registry { ledger }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Stores a record of `kind` under `key`, overwriting any previous value.
    ///
    /// `fields` must be exactly `[firstName, secondName, age, address]`.
    pub fn register(
        &mut self,
        kind: RecordKind,
        key: &str,
        fields: &[String],
    ) -> Result<(), RegistryError> {
        let record = Record::from_fields(kind, fields)?;
        self.put_record(key, &record)
    }

    /// Raw stored bytes for `key`; empty when the key was never written.
    pub fn query_one(&self, key: &str) -> Result<Vec<u8>, RegistryError> {
        Ok(self.ledger.get(key)?.unwrap_or_default())
    }

    /// JSON array of `{"Key": .., "Record": ..}` for every key in `[start, end)`.
    ///
    /// Stored values are embedded as-is. An iteration error discards the
    /// partial result.
    pub fn query_range(&self, start: &str, end: &str) -> Result<Vec<u8>, RegistryError> {
        let cursor = self.ledger.scan(start, end)?;
        let mut out = JsonArray::new();
        for item in cursor {
            let (key, value) = item?;
            out.push(&key, &value)?;
        }
        Ok(out.finish())
    }

    /// Like [`query_range`](Self::query_range) over the whole keyspace, keeping
    /// only records of `kind`.
    pub fn query_kind(&self, kind: RecordKind) -> Result<Vec<u8>, RegistryError> {
        let cursor = self.ledger.scan("", SCAN_OPEN_END)?;
        let mut out = JsonArray::new();
        for item in cursor {
            let (key, value) = item?;
            if record::decode(&value)?.kind == kind {
                out.push(&key, &value)?;
            }
        }
        Ok(out.finish())
    }

    /// Writes the fixture patients in index order. Returns how many were written.
    pub fn seed(&mut self) -> Result<usize, RegistryError> {
        for (i, [first_name, second_name, age, address]) in SEED_PATIENTS.iter().enumerate() {
            let record = Record::new(RecordKind::Patient, *first_name, *second_name, *age, *address);
            let key = alloc::format!("{}{}", SEED_KEY_PREFIX, i);
            self.put_record(&key, &record)?;
        }
        Ok(SEED_PATIENTS.len())
    }

    fn put_record(&mut self, key: &str, record: &Record) -> Result<(), RegistryError> {
        let bytes = record::encode(record)?;
        self.ledger.put(key, &bytes)?;
        Ok(())
    }
}

/// Incremental writer for the range-scan result array.
struct JsonArray {
    buf: Vec<u8>,
    empty: bool,
}

impl JsonArray {
    fn new() -> Self {
        let mut buf = Vec::new();
        buf.push(b'[');
        JsonArray { buf, empty: true }
    }

    fn push(&mut self, key: &str, value: &[u8]) -> Result<(), RegistryError> {
        if !self.empty {
            self.buf.push(b',');
        }
        self.empty = false;
        self.buf.extend_from_slice(b"{\"Key\":");
        let quoted = serde_json::to_vec(key).map_err(record::CodecError::from)?;
        self.buf.extend_from_slice(&quoted);
        self.buf.extend_from_slice(b",\"Record\":");
        self.buf.extend_from_slice(value);
        self.buf.push(b'}');
        Ok(())
    }

    fn finish(mut self) -> Vec<u8> {
        self.buf.push(b']');
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Cursor, Entry, LedgerError, MemoryLedger};
    use alloc::boxed::Box;
    use alloc::string::ToString;
    use alloc::vec;
    use core::cell::Cell;
    use serde_json::Value;

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn registry() -> Registry<MemoryLedger> {
        Registry::new(MemoryLedger::new())
    }

    fn parse(bytes: &[u8]) -> Value {
        serde_json::from_slice(bytes).unwrap()
    }

    /// Ledger whose cursors fail after `fail_after` items and count open cursors.
    struct FaultyLedger {
        inner: MemoryLedger,
        fail_after: usize,
        open_cursors: Cell<usize>,
    }

    struct TrackedCursor<'a> {
        items: vec::IntoIter<Entry>,
        remaining: usize,
        open_cursors: &'a Cell<usize>,
    }

    impl Iterator for TrackedCursor<'_> {
        type Item = Result<Entry, LedgerError>;

        fn next(&mut self) -> Option<Self::Item> {
            if self.remaining == 0 {
                return Some(Err(LedgerError::Read("peer unavailable".to_string())));
            }
            self.remaining -= 1;
            self.items.next().map(Ok)
        }
    }

    impl Drop for TrackedCursor<'_> {
        fn drop(&mut self) {
            self.open_cursors.set(self.open_cursors.get() - 1);
        }
    }

    impl Ledger for FaultyLedger {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
            Err(LedgerError::Read("peer unavailable".to_string()))
        }

        fn put(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
            self.inner.put(key, value)
        }

        fn scan(&self, start: &str, end: &str) -> Result<Cursor<'_>, LedgerError> {
            let items = self
                .inner
                .scan(start, end)?
                .collect::<Result<Vec<Entry>, LedgerError>>()?;
            self.open_cursors.set(self.open_cursors.get() + 1);
            Ok(Box::new(TrackedCursor {
                items: items.into_iter(),
                remaining: self.fail_after,
                open_cursors: &self.open_cursors,
            }))
        }
    }

    #[test]
    fn test_register_then_query_one() {
        let mut registry = registry();
        registry
            .register(
                RecordKind::Patient,
                "P1",
                &fields(&["Ana", "Lee", "30", "Springfield"]),
            )
            .unwrap();

        let bytes = registry.query_one("P1").unwrap();
        let record = record::decode(&bytes).unwrap();
        assert_eq!(
            record,
            Record::new(RecordKind::Patient, "Ana", "Lee", "30", "Springfield")
        );
    }

    #[test]
    fn test_register_overwrites_silently() {
        let mut registry = registry();
        registry
            .register(RecordKind::Patient, "k", &fields(&["A", "B", "1", "X"]))
            .unwrap();
        registry
            .register(RecordKind::Doctor, "k", &fields(&["C", "D", "2", "Y"]))
            .unwrap();

        let record = record::decode(&registry.query_one("k").unwrap()).unwrap();
        assert_eq!(record.kind, RecordKind::Doctor);
        assert_eq!(record.first_name, "C");
        assert_eq!(registry.ledger().len(), 1);
    }

    #[test]
    fn test_register_wrong_field_count() {
        let mut registry = registry();
        let result = registry.register(RecordKind::Doctor, "k", &fields(&["A", "B", "1"]));
        assert_eq!(
            result,
            Err(RegistryError::Arity {
                expected: 4,
                received: 3
            })
        );
        assert!(registry.ledger().is_empty());
    }

    #[test]
    fn test_query_one_absent_is_empty() {
        let registry = registry();
        assert_eq!(registry.query_one("ghost"), Ok(Vec::new()));
    }

    #[test]
    fn test_query_one_surfaces_adapter_failure() {
        let registry = Registry::new(FaultyLedger {
            inner: MemoryLedger::new(),
            fail_after: 0,
            open_cursors: Cell::new(0),
        });
        assert_eq!(
            registry.query_one("P1"),
            Err(RegistryError::LedgerRead("peer unavailable".to_string()))
        );
    }

    #[test]
    fn test_query_range_embeds_values_in_key_order() {
        let mut registry = registry();
        for (key, name) in [("PATIENT2", "Bo"), ("PATIENT0", "Al"), ("PATIENT1", "Cy")] {
            registry
                .register(RecordKind::Patient, key, &fields(&[name, "X", "40", "Town"]))
                .unwrap();
        }
        // Sorts before the range start
        registry
            .register(RecordKind::Patient, "P1", &fields(&["Ed", "X", "1", "Town"]))
            .unwrap();

        let out = registry.query_range(PATIENT_SCAN_START, SCAN_OPEN_END).unwrap();
        let array = parse(&out);
        let array = array.as_array().unwrap();

        assert_eq!(array.len(), 3);
        let keys: Vec<&str> = array.iter().map(|e| e["Key"].as_str().unwrap()).collect();
        assert_eq!(keys, vec!["PATIENT0", "PATIENT1", "PATIENT2"]);
        for entry in array {
            let stored = registry.query_one(entry["Key"].as_str().unwrap()).unwrap();
            assert_eq!(entry["Record"], parse(&stored));
        }
    }

    #[test]
    fn test_query_range_value_is_verbatim() {
        let mut ledger = MemoryLedger::new();
        let raw = br#"{"firstName":"A","secondName":"B","age":"1","address":"C"}"#;
        ledger.put("PATIENT9", raw).unwrap();
        let registry = Registry::new(ledger);

        let out = registry.query_range(PATIENT_SCAN_START, SCAN_OPEN_END).unwrap();
        let mut expected = b"[{\"Key\":\"PATIENT9\",\"Record\":".to_vec();
        expected.extend_from_slice(raw);
        expected.extend_from_slice(b"}]");
        assert_eq!(out, expected);
    }

    #[test]
    fn test_query_range_empty() {
        let registry = registry();
        assert_eq!(
            registry.query_range(PATIENT_SCAN_START, SCAN_OPEN_END),
            Ok(b"[]".to_vec())
        );
    }

    #[test]
    fn test_query_range_escapes_keys() {
        let mut registry = registry();
        registry
            .register(RecordKind::Patient, "q\"uote", &fields(&["A", "B", "1", "C"]))
            .unwrap();

        let out = registry.query_range("", SCAN_OPEN_END).unwrap();
        assert_eq!(parse(&out)[0]["Key"], "q\"uote");
    }

    #[test]
    fn test_query_range_iteration_error_releases_cursor() {
        let mut inner = MemoryLedger::new();
        for key in ["PATIENT0", "PATIENT1", "PATIENT2"] {
            inner.put(key, b"{}").unwrap();
        }
        let registry = Registry::new(FaultyLedger {
            inner,
            fail_after: 2,
            open_cursors: Cell::new(0),
        });

        assert_eq!(
            registry.query_range(PATIENT_SCAN_START, SCAN_OPEN_END),
            Err(RegistryError::LedgerRead("peer unavailable".to_string()))
        );
        assert_eq!(registry.ledger().open_cursors.get(), 0);
    }

    #[test]
    fn test_query_range_success_releases_cursor() {
        let mut inner = MemoryLedger::new();
        inner.put("PATIENT0", b"{}").unwrap();
        let registry = Registry::new(FaultyLedger {
            inner,
            fail_after: usize::MAX,
            open_cursors: Cell::new(0),
        });

        assert!(registry.query_range(PATIENT_SCAN_START, SCAN_OPEN_END).is_ok());
        assert_eq!(registry.ledger().open_cursors.get(), 0);
    }

    #[test]
    fn test_query_kind_filters_doctors() {
        let mut registry = registry();
        registry
            .register(RecordKind::Patient, "PATIENT0", &fields(&["A", "B", "1", "C"]))
            .unwrap();
        registry
            .register(RecordKind::Doctor, "Waqas", &fields(&["Waqas", "Khan", "45", "Lahore"]))
            .unwrap();
        registry
            .register(RecordKind::Doctor, "Ayesha", &fields(&["Ayesha", "Malik", "38", "Karachi"]))
            .unwrap();

        let out = registry.query_kind(RecordKind::Doctor).unwrap();
        let array = parse(&out);
        let keys: Vec<&str> = array
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["Key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["Ayesha", "Waqas"]);
        assert_eq!(array[1]["Record"]["docType"], "doctor");
    }

    #[test]
    fn test_query_kind_rejects_malformed_value() {
        let mut ledger = MemoryLedger::new();
        ledger.put("broken", b"not json").unwrap();
        let registry = Registry::new(ledger);

        assert!(matches!(
            registry.query_kind(RecordKind::Doctor),
            Err(RegistryError::Codec(_))
        ));
    }

    #[test]
    fn test_seed_writes_fixtures_in_order() {
        let mut registry = registry();
        assert_eq!(registry.seed(), Ok(2));
        // Re-running overwrites with identical values
        assert_eq!(registry.seed(), Ok(2));
        assert_eq!(registry.ledger().len(), 2);

        let first = record::decode(&registry.query_one("patient0").unwrap()).unwrap();
        assert_eq!(
            first,
            Record::new(RecordKind::Patient, "Zaheer", "wasa", "22", "islamabad")
        );
        let second = record::decode(&registry.query_one("patient1").unwrap()).unwrap();
        assert_eq!(second.first_name, "Khaliq");
    }

    #[test]
    fn test_seed_then_query_range() {
        let mut registry = registry();
        registry.seed().unwrap();

        let out = registry.query_range(PATIENT_SCAN_START, SCAN_OPEN_END).unwrap();
        let array = parse(&out);
        let keys: Vec<&str> = array
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["Key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["patient0", "patient1"]);
    }
}
