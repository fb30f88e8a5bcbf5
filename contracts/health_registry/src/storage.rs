use alloc::boxed::Box;
use alloc::format;
use alloc::string::String as StdString;
use alloc::vec;
use alloc::vec::Vec as StdVec;

use soroban_sdk::{symbol_short, Bytes, Env, String, Symbol, Vec};

use crate::ledger::{in_range, Cursor, Entry, Ledger, LedgerError};

// ── Storage keys ──────────────────────────────────────────────
const REC: Symbol = symbol_short!("REC");
const REC_IDX: Symbol = symbol_short!("REC_IDX");

// ── TTL ───────────────────────────────────────────────────────
pub const TTL_THRESHOLD: u32 = 518_400; // ~30 days
pub const TTL_EXTEND_TO: u32 = 3_110_400; // ~180 days

/// Copies a host string into an owned UTF-8 string.
pub(crate) fn host_string(value: &String) -> Option<StdString> {
    let mut buf = vec![0u8; value.len() as usize];
    value.copy_into_slice(&mut buf);
    StdString::from_utf8(buf).ok()
}

fn host_bytes(value: &Bytes) -> StdVec<u8> {
    let mut buf = vec![0u8; value.len() as usize];
    value.copy_into_slice(&mut buf);
    buf
}

fn record_key(env: &Env, key: &str) -> (Symbol, String) {
    (REC, String::from_str(env, key))
}

/// [`Ledger`] backed by the contract's persistent storage.
///
/// Soroban storage cannot iterate, so every key is also kept in a sorted
/// index under `REC_IDX`.
pub struct SorobanLedger {
    env: Env,
}

impl SorobanLedger {
    pub fn new(env: &Env) -> Self {
        SorobanLedger { env: env.clone() }
    }

    fn load_index(&self) -> Vec<String> {
        self.env
            .storage()
            .persistent()
            .get(&REC_IDX)
            .unwrap_or(Vec::new(&self.env))
    }

    fn index_insert(&self, key: &str) -> Result<(), LedgerError> {
        let mut index = self.load_index();
        let mut pos = index.len();
        for (i, existing) in index.iter().enumerate() {
            let existing = host_string(&existing)
                .ok_or_else(|| LedgerError::Write(StdString::from("index holds a non UTF-8 key")))?;
            if existing.as_str() > key {
                pos = i as u32;
                break;
            }
        }
        index.insert(pos, String::from_str(&self.env, key));

        let storage = self.env.storage().persistent();
        storage.set(&REC_IDX, &index);
        storage.extend_ttl(&REC_IDX, TTL_THRESHOLD, TTL_EXTEND_TO);
        Ok(())
    }
}

impl Ledger for SorobanLedger {
    fn get(&self, key: &str) -> Result<Option<StdVec<u8>>, LedgerError> {
        let value: Option<Bytes> = self
            .env
            .storage()
            .persistent()
            .get(&record_key(&self.env, key));
        Ok(value.map(|bytes| host_bytes(&bytes)))
    }

    fn put(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        let entry_key = record_key(&self.env, key);
        let storage = self.env.storage().persistent();
        let is_new = !storage.has(&entry_key);

        storage.set(&entry_key, &Bytes::from_slice(&self.env, value));
        storage.extend_ttl(&entry_key, TTL_THRESHOLD, TTL_EXTEND_TO);

        if is_new {
            self.index_insert(key)?;
        }
        Ok(())
    }

    fn scan(&self, start: &str, end: &str) -> Result<Cursor<'_>, LedgerError> {
        Ok(Box::new(IndexCursor {
            env: self.env.clone(),
            keys: self.load_index(),
            pos: 0,
            start: StdString::from(start),
            end: StdString::from(end),
        }))
    }
}

/// Walks the sorted key index, fetching each value on demand.
struct IndexCursor {
    env: Env,
    keys: Vec<String>,
    pos: u32,
    start: StdString,
    end: StdString,
}

impl Iterator for IndexCursor {
    type Item = Result<Entry, LedgerError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(raw) = self.keys.get(self.pos) {
            self.pos += 1;
            let key = match host_string(&raw) {
                Some(key) => key,
                None => {
                    return Some(Err(LedgerError::Read(StdString::from(
                        "index holds a non UTF-8 key",
                    ))))
                }
            };
            if !self.end.is_empty() && key.as_str() >= self.end.as_str() {
                // Sorted index: nothing further can be in range.
                self.pos = self.keys.len();
                return None;
            }
            if !in_range(&key, &self.start, &self.end) {
                continue;
            }

            let value: Option<Bytes> = self
                .env
                .storage()
                .persistent()
                .get(&record_key(&self.env, &key));
            return Some(match value {
                Some(bytes) => Ok((key, host_bytes(&bytes))),
                None => Err(LedgerError::Read(format!("index entry {key} has no value"))),
            });
        }
        None
    }
}
