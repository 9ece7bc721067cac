//! Domain error model.

use thiserror::Error;

use crate::id::GroupId;

/// Result type used across the ledger domain.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Ledger-level error.
///
/// Every failure is synchronous and local to the call that raised it; no
/// partial state is committed alongside any of these. Keep this focused on
/// deterministic domain failures — transport concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Caller lacks the required capability/ownership for the operation.
    #[error("unauthorized")]
    Unauthorized,

    /// Reference to a group id that was never allocated.
    #[error("unknown group: {0}")]
    UnknownGroup(GroupId),

    /// Member index exceeds the group's member count.
    #[error("member index {index} out of range (member count {len})")]
    OutOfRange { index: usize, len: usize },

    /// Loan index does not address one of the member's loan records.
    #[error("loan index {index} invalid (loan count {count})")]
    InvalidLoanIndex { index: u64, count: u64 },

    /// Operation requires an open group.
    #[error("group {0} is closed")]
    GroupClosed(GroupId),

    /// Close requested on an already-closed group.
    #[error("group {0} is already closed")]
    GroupAlreadyClosed(GroupId),

    /// Loan amount requested exceeds the group's current funding.
    #[error("requested {requested} exceeds available funding {available}")]
    ExceedsAvailableFunding { requested: u128, available: u128 },

    /// Funding confirmation exceeds what the asset collaborator custodies.
    #[error("required {required} exceeds custodied balance {custodied}")]
    InsufficientCustody { required: u128, custodied: u128 },

    /// The external asset collaborator reported failure.
    #[error("external transfer failed: {0}")]
    ExternalTransferFailed(String),

    /// A principal was malformed or not a valid target for the operation.
    #[error("invalid principal: {0}")]
    InvalidPrincipal(String),

    /// One-time setup was attempted a second time.
    #[error("already initialized")]
    AlreadyInitialized,

    /// A value failed validation (zero amounts, arithmetic overflow).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl LedgerError {
    pub fn invalid_principal(msg: impl Into<String>) -> Self {
        Self::InvalidPrincipal(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn transfer_failed(msg: impl Into<String>) -> Self {
        Self::ExternalTransferFailed(msg.into())
    }
}
