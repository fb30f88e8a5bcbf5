use soroban_sdk::{contracttype, symbol_short, Env, String, Symbol};

use crate::record::RecordKind;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub version: u32,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordRegisteredEvent {
    pub key: String,
    pub kind: Symbol,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerSeededEvent {
    pub count: u32,
}

pub fn kind_symbol(kind: RecordKind) -> Symbol {
    match kind {
        RecordKind::Patient => symbol_short!("patient"),
        RecordKind::Doctor => symbol_short!("doctor"),
    }
}

pub fn publish_initialized(env: &Env, version: u32) {
    env.events()
        .publish((symbol_short!("INIT"),), InitializedEvent { version });
}

pub fn publish_record_registered(env: &Env, key: String, kind: RecordKind) {
    let kind = kind_symbol(kind);
    env.events().publish(
        (symbol_short!("REC_REG"), kind.clone(), key.clone()),
        RecordRegisteredEvent { key, kind },
    );
}

pub fn publish_ledger_seeded(env: &Env, count: u32) {
    env.events()
        .publish((symbol_short!("SEEDED"),), LedgerSeededEvent { count });
}
