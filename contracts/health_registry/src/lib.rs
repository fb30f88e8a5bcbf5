#![no_std]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod errors;
pub mod events;
pub mod ledger;
pub mod record;
pub mod registry;
pub mod router;
pub mod storage;

use alloc::{string::String as StdString, vec::Vec as StdVec};

use soroban_sdk::{contract, contractimpl, Bytes, Env, String, Vec};

pub use errors::{log_error, ContractError, RegistryError};
#[cfg(any(test, feature = "testutils"))]
pub use ledger::MemoryLedger;
pub use ledger::{Ledger, LedgerError};
pub use record::{CodecError, Record, RecordKind};
pub use registry::Registry;
pub use router::{Function, Response, Router};
pub use storage::SorobanLedger;

const CONTRACT_VERSION: u32 = 1;

#[contract]
pub struct HealthRegistryContract;

#[contractimpl]
impl HealthRegistryContract {
    /// Instantiation hook. The ledger starts empty; fixtures are written by
    /// an explicit `initLedger` call.
    pub fn init(env: Env) -> Result<(), ContractError> {
        events::publish_initialized(&env, CONTRACT_VERSION);
        Ok(())
    }

    /// Run a named registry function.
    ///
    /// Returns the operation payload (possibly empty). Failures are logged
    /// with their message and returned as a `ContractError` code.
    pub fn invoke(env: Env, function: String, args: Vec<String>) -> Result<Bytes, ContractError> {
        let name = storage::host_string(&function).ok_or(ContractError::InvalidArgument)?;
        let mut call_args: StdVec<StdString> = StdVec::with_capacity(args.len() as usize);
        for arg in args.iter() {
            call_args.push(storage::host_string(&arg).ok_or(ContractError::InvalidArgument)?);
        }

        let mut router = Router::new(SorobanLedger::new(&env));
        match router.dispatch(&name, &call_args) {
            Ok(payload) => {
                match Function::from_name(&name) {
                    Some(Function::InitLedger) => {
                        events::publish_ledger_seeded(&env, registry::SEED_PATIENTS.len() as u32)
                    }
                    Some(f) => {
                        if let (Some(kind), Some(key)) = (f.registers(), args.get(0)) {
                            events::publish_record_registered(&env, key, kind);
                        }
                    }
                    None => {}
                }
                Ok(Bytes::from_slice(&env, &payload))
            }
            Err(err) => {
                log_error(&env, &name, &err);
                Err(ContractError::from(&err))
            }
        }
    }

    /// Contract version
    pub fn version() -> u32 {
        CONTRACT_VERSION
    }
}
