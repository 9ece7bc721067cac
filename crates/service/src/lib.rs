//! `lendpool-service` — the public operation surface of the lending ledger.
//!
//! Wires the access gate, group registry, asset collaborator, and event log
//! into one facade. Transport (RPC, HTTP, whatever carries the calls) and
//! authentication live outside; callers arrive here as already-authenticated
//! principals.

pub mod ledger;

pub use ledger::LendingLedger;
