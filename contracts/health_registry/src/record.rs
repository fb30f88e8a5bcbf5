use alloc::string::{String, ToString};
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::errors::RegistryError;

/// Number of positional fields every record variant carries.
pub const FIELD_COUNT: usize = 4;

/// Record variants held by the registry.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[cfg_attr(test, derive(proptest_derive::Arbitrary))]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    #[default]
    Patient,
    Doctor,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Patient => "patient",
            RecordKind::Doctor => "doctor",
        }
    }
}

/// A person registered on the ledger.
///
/// Identity is extrinsic: the ledger key a record is stored under is not part
/// of the record. `age` is free text.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub first_name: String,
    pub second_name: String,
    pub age: String,
    pub address: String,
    /// Values written before the discriminant existed only ever held patients.
    #[serde(rename = "docType", default)]
    pub kind: RecordKind,
}

impl Record {
    pub fn new(
        kind: RecordKind,
        first_name: impl Into<String>,
        second_name: impl Into<String>,
        age: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        Record {
            first_name: first_name.into(),
            second_name: second_name.into(),
            age: age.into(),
            address: address.into(),
            kind,
        }
    }

    /// Builds a record from `[firstName, secondName, age, address]`.
    pub fn from_fields(kind: RecordKind, fields: &[String]) -> Result<Self, RegistryError> {
        match fields {
            [first_name, second_name, age, address] => Ok(Record::new(
                kind,
                first_name.as_str(),
                second_name.as_str(),
                age.as_str(),
                address.as_str(),
            )),
            _ => Err(RegistryError::Arity {
                expected: FIELD_COUNT,
                received: fields.len(),
            }),
        }
    }
}

/// Stored bytes were not a valid record encoding.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CodecError(pub String);

impl From<serde_json::Error> for CodecError {
    fn from(err: serde_json::Error) -> Self {
        CodecError(err.to_string())
    }
}

/// Encodes a record as a JSON object.
///
/// The output is always valid JSON; range scans embed stored values verbatim
/// and rely on this.
pub fn encode(record: &Record) -> Result<Vec<u8>, CodecError> {
    Ok(serde_json::to_vec(record)?)
}

pub fn decode(bytes: &[u8]) -> Result<Record, CodecError> {
    Ok(serde_json::from_slice(bytes)?)
}
