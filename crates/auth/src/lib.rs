//! `lendpool-auth` — pure authorization boundary.
//!
//! This crate is intentionally decoupled from transport and storage. The
//! [`AccessGate`] is an explicit, owned service object: every authorization
//! decision is a function call against it, with no ambient global state.

pub mod gate;
pub mod role;

pub use gate::AccessGate;
pub use role::Role;
