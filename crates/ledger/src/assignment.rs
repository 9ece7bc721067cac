//! Manager reassignment.

use chrono::{DateTime, Utc};

use lendpool_auth::AccessGate;
use lendpool_core::{GroupId, LedgerResult, PrincipalId};

use crate::event::{GroupEvent, ManagerChanged};
use crate::registry::GroupRegistry;

/// Reassign a group's manager. Owner-only.
///
/// The manager grant is scoped to this group: the previous manager keeps any
/// grants they hold for other groups. Revoke-then-grant order so reassigning
/// to the same principal leaves the grant in place.
pub fn change_manager(
    gate: &mut AccessGate,
    registry: &mut GroupRegistry,
    caller: PrincipalId,
    group_id: GroupId,
    new_manager: PrincipalId,
    occurred_at: DateTime<Utc>,
) -> LedgerResult<GroupEvent> {
    gate.ensure_owner(caller)?;

    let group = registry.get_mut(group_id)?;
    group.ensure_open()?;

    let previous = group.manager();
    gate.revoke_manager(group_id, previous);
    gate.grant_manager(group_id, new_manager);
    group.set_manager(new_manager);

    Ok(GroupEvent::ManagerChanged(ManagerChanged {
        group_id,
        previous,
        new: new_manager,
        occurred_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendpool_core::{AssetId, LedgerError};

    fn fixture() -> (AccessGate, GroupRegistry, PrincipalId, PrincipalId, GroupId) {
        let owner = PrincipalId::new();
        let manager = PrincipalId::new();
        let mut gate = AccessGate::new();
        gate.bootstrap(owner);
        let mut registry = GroupRegistry::new();
        let (group_id, _) = registry
            .create_group(&mut gate, owner, manager, AssetId::new(), Utc::now())
            .unwrap();
        (gate, registry, owner, manager, group_id)
    }

    #[test]
    fn reassignment_moves_the_scoped_grant() {
        let (mut gate, mut registry, owner, old_manager, group_id) = fixture();
        let new_manager = PrincipalId::new();

        let event =
            change_manager(&mut gate, &mut registry, owner, group_id, new_manager, Utc::now())
                .unwrap();

        assert_eq!(registry.get(group_id).unwrap().manager(), new_manager);
        assert!(gate.is_group_manager(group_id, new_manager));
        assert!(!gate.is_group_manager(group_id, old_manager));
        match event {
            GroupEvent::ManagerChanged(e) => {
                assert_eq!(e.previous, old_manager);
                assert_eq!(e.new, new_manager);
            }
            other => panic!("expected ManagerChanged, got {other:?}"),
        }
    }

    #[test]
    fn reassignment_leaves_other_groups_grants_alone() {
        let (mut gate, mut registry, owner, manager, first_group) = fixture();
        // The same principal manages a second group.
        let (second_group, _) = registry
            .create_group(&mut gate, owner, manager, AssetId::new(), Utc::now())
            .unwrap();

        change_manager(&mut gate, &mut registry, owner, first_group, PrincipalId::new(), Utc::now())
            .unwrap();

        assert!(!gate.is_group_manager(first_group, manager));
        assert!(gate.is_group_manager(second_group, manager));
    }

    #[test]
    fn reassigning_to_the_sitting_manager_keeps_the_grant() {
        let (mut gate, mut registry, owner, manager, group_id) = fixture();

        change_manager(&mut gate, &mut registry, owner, group_id, manager, Utc::now()).unwrap();

        assert_eq!(registry.get(group_id).unwrap().manager(), manager);
        assert!(gate.is_group_manager(group_id, manager));
    }

    #[test]
    fn only_owner_reassigns_and_closed_groups_refuse() {
        let (mut gate, mut registry, owner, manager, group_id) = fixture();

        let err = change_manager(
            &mut gate,
            &mut registry,
            manager,
            group_id,
            PrincipalId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized);

        registry.close_group(&gate, owner, group_id, Utc::now()).unwrap();
        let err = change_manager(
            &mut gate,
            &mut registry,
            owner,
            group_id,
            PrincipalId::new(),
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::GroupClosed(group_id));
    }
}
