use serde::{Deserialize, Serialize};

use crate::Event;

/// An event recorded in the observable log, with its assigned position.
///
/// Sequence numbers are assigned at append time and are:
/// - **monotonically increasing**: each entry gets `last + 1`, starting at 1
/// - **gapless**: one entry per successful state change, none on failure
/// - **immutable**: once assigned, never rewritten
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedEvent<E> {
    sequence_number: u64,
    payload: E,
}

impl<E> LoggedEvent<E> {
    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

/// Append-only log of domain events.
///
/// The log itself is not synchronized; the owner serializes access (the
/// ledger facade holds it behind its single-writer state).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog<E> {
    entries: Vec<LoggedEvent<E>>,
}

impl<E: Event> EventLog<E> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Append an event, assigning the next sequence number. Returns the
    /// assigned number.
    pub fn append(&mut self, payload: E) -> u64 {
        let sequence_number = self.entries.last().map(|e| e.sequence_number).unwrap_or(0) + 1;
        self.entries.push(LoggedEvent {
            sequence_number,
            payload,
        });
        sequence_number
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[LoggedEvent<E>] {
        &self.entries
    }

    pub fn last(&self) -> Option<&LoggedEvent<E>> {
        self.entries.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Ping {
        at: DateTime<Utc>,
    }

    impl Event for Ping {
        fn event_type(&self) -> &'static str {
            "test.ping"
        }

        fn version(&self) -> u32 {
            1
        }

        fn occurred_at(&self) -> DateTime<Utc> {
            self.at
        }
    }

    #[test]
    fn append_assigns_gapless_sequence_numbers_from_one() {
        let mut log = EventLog::new();
        assert!(log.is_empty());

        for expected in 1..=5u64 {
            let assigned = log.append(Ping { at: Utc::now() });
            assert_eq!(assigned, expected);
        }

        assert_eq!(log.len(), 5);
        let numbers: Vec<u64> = log.entries().iter().map(|e| e.sequence_number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }
}
