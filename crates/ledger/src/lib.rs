//! `lendpool-ledger` — the group/loan accounting engine.
//!
//! This crate contains the business rules for lending groups: registration,
//! membership, custodial funding, loan issuance/repayment, and manager
//! reassignment. All of it is deterministic domain logic — the only outward
//! dependency is the [`AssetLedger`] collaborator, invoked synchronously.
//!
//! Ownership discipline over the shared [`Group`] record:
//! - [`registry`] owns the group collection, id allocation, and open/closed
//!   lifecycle;
//! - [`membership`] is the only writer of the member set;
//! - [`funding`] is the only writer of `available_funding` outside loans;
//! - [`loans`] is the only writer of loan records and counts;
//! - [`assignment`] is the only writer of the manager field.

pub mod asset;
pub mod assignment;
pub mod event;
pub mod funding;
pub mod group;
pub mod loans;
pub mod membership;
pub mod registry;

pub use asset::{AssetLedger, InMemoryAssetLedger, TransferError};
pub use event::{
    GroupClosed, GroupCreated, GroupEvent, GroupFunded, LoanRepaid, LoanRequested, ManagerChanged,
    MemberAdded, MemberRemoved, MembersAdded, MembersRemoved,
};
pub use group::{Group, GroupView, LoanRecord};
pub use registry::GroupRegistry;
