use alloc::string::{String as StdString, ToString};
use core::fmt;

use soroban_sdk::{contracterror, log, Env, String};

use crate::ledger::LedgerError;
use crate::record::CodecError;

/// Contract errors
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    ArityMismatch = 1,
    UnknownFunction = 2,
    LedgerRead = 3,
    LedgerWrite = 4,
    Codec = 5,
    InvalidArgument = 6,
}

/// Failure of a single registry request.
///
/// The `Display` output is the message handed back to the caller in a
/// [`Response::Failure`](crate::router::Response::Failure).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RegistryError {
    /// Wrong number of positional arguments.
    Arity { expected: usize, received: usize },
    /// No operation is registered under this function name.
    UnknownFunction(StdString),
    LedgerRead(StdString),
    LedgerWrite(StdString),
    /// Stored bytes could not be decoded as a record.
    Codec(StdString),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Arity { expected, received } => write!(
                f,
                "Incorrect number of arguments. Expecting {expected}, received {received}"
            ),
            RegistryError::UnknownFunction(name) => {
                write!(f, "Invalid Smart Contract function name: {name}")
            }
            RegistryError::LedgerRead(msg) => write!(f, "Ledger read failed: {msg}"),
            RegistryError::LedgerWrite(msg) => write!(f, "Ledger write failed: {msg}"),
            RegistryError::Codec(msg) => write!(f, "Malformed record: {msg}"),
        }
    }
}

impl From<LedgerError> for RegistryError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Read(msg) => RegistryError::LedgerRead(msg),
            LedgerError::Write(msg) => RegistryError::LedgerWrite(msg),
        }
    }
}

impl From<CodecError> for RegistryError {
    fn from(err: CodecError) -> Self {
        RegistryError::Codec(err.0)
    }
}

impl From<&RegistryError> for ContractError {
    fn from(err: &RegistryError) -> Self {
        match err {
            RegistryError::Arity { .. } => ContractError::ArityMismatch,
            RegistryError::UnknownFunction(_) => ContractError::UnknownFunction,
            RegistryError::LedgerRead(_) => ContractError::LedgerRead,
            RegistryError::LedgerWrite(_) => ContractError::LedgerWrite,
            RegistryError::Codec(_) => ContractError::Codec,
        }
    }
}

/// Emits a diagnostic log entry for a failed invocation.
///
/// Only visible in builds with debug assertions (tests and the
/// `release-with-logs` profile).
pub fn log_error(env: &Env, function: &str, error: &RegistryError) {
    let code = ContractError::from(error) as u32;
    let function = String::from_str(env, function);
    let message = String::from_str(env, &error.to_string());
    log!(env, "invoke failed", function, code, message);
}
