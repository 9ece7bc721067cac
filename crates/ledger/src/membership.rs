//! Member set administration, single and batch.
//!
//! Authorized for the owner or the group's own manager (manager grants are
//! scoped per group). All variants use set semantics: re-adding a present
//! member or removing an absent one changes nothing and is not an error,
//! and the event always carries the exact arguments supplied.

use chrono::{DateTime, Utc};

use lendpool_auth::AccessGate;
use lendpool_core::{GroupId, LedgerError, LedgerResult, PrincipalId};

use crate::event::{GroupEvent, MemberAdded, MemberRemoved, MembersAdded, MembersRemoved};
use crate::registry::GroupRegistry;

fn ensure_manager_or_owner(
    gate: &AccessGate,
    group_id: GroupId,
    caller: PrincipalId,
) -> LedgerResult<()> {
    if gate.is_owner(caller) || gate.is_group_manager(group_id, caller) {
        Ok(())
    } else {
        Err(LedgerError::Unauthorized)
    }
}

pub fn add_member(
    gate: &AccessGate,
    registry: &mut GroupRegistry,
    caller: PrincipalId,
    group_id: GroupId,
    member: PrincipalId,
    occurred_at: DateTime<Utc>,
) -> LedgerResult<GroupEvent> {
    ensure_manager_or_owner(gate, group_id, caller)?;

    let group = registry.get_mut(group_id)?;
    group.ensure_open()?;
    group.insert_member(member);
    registry.record_user_group(member, group_id);

    Ok(GroupEvent::MemberAdded(MemberAdded {
        group_id,
        member,
        occurred_at,
    }))
}

pub fn remove_member(
    gate: &AccessGate,
    registry: &mut GroupRegistry,
    caller: PrincipalId,
    group_id: GroupId,
    member: PrincipalId,
    occurred_at: DateTime<Utc>,
) -> LedgerResult<GroupEvent> {
    ensure_manager_or_owner(gate, group_id, caller)?;

    let group = registry.get_mut(group_id)?;
    group.ensure_open()?;
    group.remove_member(member);

    Ok(GroupEvent::MemberRemoved(MemberRemoved {
        group_id,
        member,
        occurred_at,
    }))
}

pub fn add_members(
    gate: &AccessGate,
    registry: &mut GroupRegistry,
    caller: PrincipalId,
    group_id: GroupId,
    members: Vec<PrincipalId>,
    occurred_at: DateTime<Utc>,
) -> LedgerResult<GroupEvent> {
    ensure_manager_or_owner(gate, group_id, caller)?;

    let group = registry.get_mut(group_id)?;
    group.ensure_open()?;
    for member in &members {
        group.insert_member(*member);
    }
    for member in &members {
        registry.record_user_group(*member, group_id);
    }

    Ok(GroupEvent::MembersAdded(MembersAdded {
        group_id,
        members,
        occurred_at,
    }))
}

pub fn remove_members(
    gate: &AccessGate,
    registry: &mut GroupRegistry,
    caller: PrincipalId,
    group_id: GroupId,
    members: Vec<PrincipalId>,
    occurred_at: DateTime<Utc>,
) -> LedgerResult<GroupEvent> {
    ensure_manager_or_owner(gate, group_id, caller)?;

    let group = registry.get_mut(group_id)?;
    group.ensure_open()?;
    for member in &members {
        group.remove_member(*member);
    }

    Ok(GroupEvent::MembersRemoved(MembersRemoved {
        group_id,
        members,
        occurred_at,
    }))
}
