use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

/// A stored `(key, value)` pair as yielded by a range scan.
pub type Entry = (String, Vec<u8>);

/// Forward-only cursor over a range scan.
///
/// Dropping the cursor releases it; callers never close it by hand.
pub type Cursor<'a> = Box<dyn Iterator<Item = Result<Entry, LedgerError>> + 'a>;

/// Failure reported by the underlying ledger.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LedgerError {
    Read(String),
    Write(String),
}

/// The key/value ledger the registry runs on.
///
/// Consensus, persistence and ordering belong to the host; the registry only
/// needs point reads, point writes and an ordered range scan.
pub trait Ledger {
    /// Returns `Ok(None)` for a key that was never written.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError>;

    /// Scans `[start, end)` in byte-wise key order. An empty `end` leaves the
    /// range open.
    fn scan(&self, start: &str, end: &str) -> Result<Cursor<'_>, LedgerError>;
}

/// Whether `key` falls inside the scan range `[start, end)`.
pub fn in_range(key: &str, start: &str, end: &str) -> bool {
    key >= start && (end.is_empty() || key < end)
}

#[cfg(any(test, feature = "testutils"))]
pub use memory::MemoryLedger;

#[cfg(any(test, feature = "testutils"))]
mod memory {
    use alloc::boxed::Box;
    use alloc::collections::BTreeMap;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;
    use core::ops::Bound;

    use super::{Cursor, Entry, Ledger, LedgerError};

    /// Ledger kept in a `BTreeMap`, for tests and fuzzing without a host.
    #[derive(Clone, Debug, Default)]
    pub struct MemoryLedger {
        entries: BTreeMap<String, Vec<u8>>,
    }

    impl MemoryLedger {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn len(&self) -> usize {
            self.entries.len()
        }

        pub fn is_empty(&self) -> bool {
            self.entries.is_empty()
        }
    }

    impl Ledger for MemoryLedger {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
            Ok(self.entries.get(key).cloned())
        }

        fn put(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
            self.entries.insert(key.to_string(), value.to_vec());
            Ok(())
        }

        fn scan(&self, start: &str, end: &str) -> Result<Cursor<'_>, LedgerError> {
            // BTreeMap::range panics on an inverted range.
            if !end.is_empty() && start >= end {
                return Ok(Box::new(core::iter::empty::<Result<Entry, LedgerError>>()));
            }
            let upper = if end.is_empty() {
                Bound::Unbounded
            } else {
                Bound::Excluded(end)
            };
            let range = self
                .entries
                .range::<str, _>((Bound::Included(start), upper))
                .map(|(key, value)| Ok::<Entry, LedgerError>((key.clone(), value.clone())));
            Ok(Box::new(range))
        }
    }
}
