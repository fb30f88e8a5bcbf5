use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::errors::RegistryError;
use crate::ledger::Ledger;
use crate::record::{RecordKind, FIELD_COUNT};
use crate::registry::{Registry, PATIENT_SCAN_START, SCAN_OPEN_END};

/// Operations reachable through [`Router::invoke`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Function {
    RegisterPatient,
    RegisterDoctor,
    QueryPatient,
    QueryDoctor,
    QueryAllPatient,
    QueryAllDoctors,
    InitLedger,
}

impl Function {
    pub const ALL: [Function; 7] = [
        Function::RegisterPatient,
        Function::RegisterDoctor,
        Function::QueryPatient,
        Function::QueryDoctor,
        Function::QueryAllPatient,
        Function::QueryAllDoctors,
        Function::InitLedger,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "registerPatient" => Some(Function::RegisterPatient),
            "registerDoctor" => Some(Function::RegisterDoctor),
            "queryPatient" => Some(Function::QueryPatient),
            "queryDoctor" => Some(Function::QueryDoctor),
            "queryAllPatient" => Some(Function::QueryAllPatient),
            "queryAllDoctors" => Some(Function::QueryAllDoctors),
            "initLedger" => Some(Function::InitLedger),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::RegisterPatient => "registerPatient",
            Function::RegisterDoctor => "registerDoctor",
            Function::QueryPatient => "queryPatient",
            Function::QueryDoctor => "queryDoctor",
            Function::QueryAllPatient => "queryAllPatient",
            Function::QueryAllDoctors => "queryAllDoctors",
            Function::InitLedger => "initLedger",
        }
    }

    /// Exact number of positional arguments the function takes.
    pub fn arity(self) -> usize {
        match self {
            // key + record fields
            Function::RegisterPatient | Function::RegisterDoctor => 1 + FIELD_COUNT,
            Function::QueryPatient | Function::QueryDoctor => 1,
            Function::QueryAllPatient | Function::QueryAllDoctors | Function::InitLedger => 0,
        }
    }

    /// The record kind written by a register function.
    pub fn registers(self) -> Option<RecordKind> {
        match self {
            Function::RegisterPatient => Some(RecordKind::Patient),
            Function::RegisterDoctor => Some(RecordKind::Doctor),
            _ => None,
        }
    }
}

/// Uniform outcome of an invocation.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Response {
    /// Payload bytes, possibly empty.
    Success(Vec<u8>),
    Failure(String),
}

impl Response {
    pub fn is_success(&self) -> bool {
        matches!(self, Response::Success(_))
    }

    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            Response::Success(payload) => Some(payload),
            Response::Failure(_) => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Response::Success(_) => None,
            Response::Failure(message) => Some(message),
        }
    }
}

impl From<Result<Vec<u8>, RegistryError>> for Response {
    fn from(result: Result<Vec<u8>, RegistryError>) -> Self {
        match result {
            Ok(payload) => Response::Success(payload),
            Err(err) => Response::Failure(err.to_string()),
        }
    }
}

/// Maps `(function name, args)` requests onto registry operations.
///
/// `invoke` takes `&mut self`, so one request runs to completion before the
/// next one can start.
pub struct Router<L> {
    registry: Registry<L>,
}

impl<L: Ledger> Router<L> {
    pub fn new(ledger: L) -> Self {
        Router {
            registry: Registry::new(ledger),
        }
    }

    pub fn registry(&self) -> &Registry<L> {
        &self.registry
    }

    pub fn invoke(&mut self, function: &str, args: &[String]) -> Response {
        self.dispatch(function, args).into()
    }

    /// Like [`invoke`](Self::invoke), keeping the typed error.
    pub fn dispatch(&mut self, function: &str, args: &[String]) -> Result<Vec<u8>, RegistryError> {
        let function = Function::from_name(function)
            .ok_or_else(|| RegistryError::UnknownFunction(function.to_string()))?;
        if args.len() != function.arity() {
            return Err(RegistryError::Arity {
                expected: function.arity(),
                received: args.len(),
            });
        }

        match function {
            Function::RegisterPatient | Function::RegisterDoctor => {
                let kind = function.registers().unwrap_or_default();
                self.registry.register(kind, &args[0], &args[1..])?;
                Ok(Vec::new())
            }
            Function::QueryPatient | Function::QueryDoctor => self.registry.query_one(&args[0]),
            Function::QueryAllPatient => {
                self.registry.query_range(PATIENT_SCAN_START, SCAN_OPEN_END)
            }
            Function::QueryAllDoctors => self.registry.query_kind(RecordKind::Doctor),
            Function::InitLedger => {
                self.registry.seed()?;
                Ok(Vec::new())
            }
        }
    }
}
