//! `lendpool-events` — domain event contract and the observable log.

pub mod event;
pub mod log;

pub use event::Event;
pub use log::{EventLog, LoggedEvent};
