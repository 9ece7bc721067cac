//! Domain events — one per successful state change, never on failure.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use lendpool_core::{AssetId, GroupId, PrincipalId};
use lendpool_events::Event;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCreated {
    pub group_id: GroupId,
    pub manager: PrincipalId,
    pub asset_id: AssetId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupClosed {
    pub group_id: GroupId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberAdded {
    pub group_id: GroupId,
    pub member: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRemoved {
    pub group_id: GroupId,
    pub member: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

/// Batch variant; carries the exact list supplied to the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersAdded {
    pub group_id: GroupId,
    pub members: Vec<PrincipalId>,
    pub occurred_at: DateTime<Utc>,
}

/// Batch variant; carries the exact list supplied to the call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembersRemoved {
    pub group_id: GroupId,
    pub members: Vec<PrincipalId>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupFunded {
    pub group_id: GroupId,
    pub funder: PrincipalId,
    pub amount: u128,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequested {
    pub group_id: GroupId,
    pub member: PrincipalId,
    /// Index into the member's loan-record sequence (stable identifier).
    pub loan_index: u64,
    pub amount: u128,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRepaid {
    pub group_id: GroupId,
    pub member: PrincipalId,
    pub loan_index: u64,
    pub amount: u128,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerChanged {
    pub group_id: GroupId,
    pub previous: PrincipalId,
    pub new: PrincipalId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GroupEvent {
    GroupCreated(GroupCreated),
    GroupClosed(GroupClosed),
    MemberAdded(MemberAdded),
    MemberRemoved(MemberRemoved),
    MembersAdded(MembersAdded),
    MembersRemoved(MembersRemoved),
    GroupFunded(GroupFunded),
    LoanRequested(LoanRequested),
    LoanRepaid(LoanRepaid),
    ManagerChanged(ManagerChanged),
}

impl Event for GroupEvent {
    fn event_type(&self) -> &'static str {
        match self {
            GroupEvent::GroupCreated(_) => "lending.group.created",
            GroupEvent::GroupClosed(_) => "lending.group.closed",
            GroupEvent::MemberAdded(_) => "lending.group.member_added",
            GroupEvent::MemberRemoved(_) => "lending.group.member_removed",
            GroupEvent::MembersAdded(_) => "lending.group.members_added",
            GroupEvent::MembersRemoved(_) => "lending.group.members_removed",
            GroupEvent::GroupFunded(_) => "lending.group.funded",
            GroupEvent::LoanRequested(_) => "lending.loan.requested",
            GroupEvent::LoanRepaid(_) => "lending.loan.repaid",
            GroupEvent::ManagerChanged(_) => "lending.group.manager_changed",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            GroupEvent::GroupCreated(e) => e.occurred_at,
            GroupEvent::GroupClosed(e) => e.occurred_at,
            GroupEvent::MemberAdded(e) => e.occurred_at,
            GroupEvent::MemberRemoved(e) => e.occurred_at,
            GroupEvent::MembersAdded(e) => e.occurred_at,
            GroupEvent::MembersRemoved(e) => e.occurred_at,
            GroupEvent::GroupFunded(e) => e.occurred_at,
            GroupEvent::LoanRequested(e) => e.occurred_at,
            GroupEvent::LoanRepaid(e) => e.occurred_at,
            GroupEvent::ManagerChanged(e) => e.occurred_at,
        }
    }
}
