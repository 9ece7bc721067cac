use std::collections::{HashMap, HashSet};

use lendpool_core::{GroupId, LedgerError, LedgerResult, PrincipalId};

use crate::Role;

/// Capability registry gating every state-changing ledger operation.
///
/// Holds the designated owner, the global role sets, and the per-group
/// manager grants. All checks are explicit function calls against this
/// object — no IO, no panics, no business logic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessGate {
    owner: Option<PrincipalId>,
    admins: HashSet<PrincipalId>,
    upgraders: HashSet<PrincipalId>,
    /// Manager grants scoped per group. Revoking a principal's grant for one
    /// group leaves their grants for other groups untouched.
    managers: HashMap<GroupId, HashSet<PrincipalId>>,
}

impl AccessGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-time owner designation: the principal receives ownership plus the
    /// admin and upgrader capabilities together.
    pub fn bootstrap(&mut self, principal: PrincipalId) {
        self.owner = Some(principal);
        self.admins.insert(principal);
        self.upgraders.insert(principal);
    }

    pub fn is_owner(&self, principal: PrincipalId) -> bool {
        self.owner == Some(principal)
    }

    pub fn has_role(&self, role: Role, principal: PrincipalId) -> bool {
        self.role_set(role).contains(&principal)
    }

    pub fn is_group_manager(&self, group_id: GroupId, principal: PrincipalId) -> bool {
        self.managers
            .get(&group_id)
            .is_some_and(|set| set.contains(&principal))
    }

    /// Errors with `Unauthorized` unless the principal is the owner.
    pub fn ensure_owner(&self, principal: PrincipalId) -> LedgerResult<()> {
        if self.is_owner(principal) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized)
        }
    }

    /// Grant a global role. The caller must hold the role-administration
    /// capability (owner or admin).
    pub fn grant_role(
        &mut self,
        caller: PrincipalId,
        role: Role,
        principal: PrincipalId,
    ) -> LedgerResult<()> {
        self.ensure_role_admin(caller)?;
        self.role_set_mut(role).insert(principal);
        Ok(())
    }

    /// Revoke a global role. Same capability requirement as [`grant_role`].
    ///
    /// [`grant_role`]: AccessGate::grant_role
    pub fn revoke_role(
        &mut self,
        caller: PrincipalId,
        role: Role,
        principal: PrincipalId,
    ) -> LedgerResult<()> {
        self.ensure_role_admin(caller)?;
        self.role_set_mut(role).remove(&principal);
        Ok(())
    }

    /// Grant the manager capability for one group.
    ///
    /// Callers (group creation, manager reassignment) perform the owner check
    /// before reaching for this.
    pub fn grant_manager(&mut self, group_id: GroupId, principal: PrincipalId) {
        self.managers.entry(group_id).or_default().insert(principal);
    }

    /// Revoke the manager capability for one group only.
    pub fn revoke_manager(&mut self, group_id: GroupId, principal: PrincipalId) {
        if let Some(set) = self.managers.get_mut(&group_id) {
            set.remove(&principal);
            if set.is_empty() {
                self.managers.remove(&group_id);
            }
        }
    }

    /// Move ownership — and the admin/upgrader capabilities that travel with
    /// it — from the current owner to `new_owner`.
    ///
    /// The grants to the new principal and the revocations from the old one
    /// happen in one `&mut` critical section: there is no reachable state in
    /// which both or neither principal holds the capabilities.
    pub fn transfer_ownership(
        &mut self,
        caller: PrincipalId,
        new_owner: PrincipalId,
    ) -> LedgerResult<()> {
        self.ensure_owner(caller)?;
        if new_owner == caller {
            return Err(LedgerError::invalid_principal(
                "ownership transfer to the current owner",
            ));
        }

        self.owner = Some(new_owner);
        self.admins.insert(new_owner);
        self.upgraders.insert(new_owner);
        self.admins.remove(&caller);
        self.upgraders.remove(&caller);
        Ok(())
    }

    fn ensure_role_admin(&self, principal: PrincipalId) -> LedgerResult<()> {
        if self.is_owner(principal) || self.admins.contains(&principal) {
            Ok(())
        } else {
            Err(LedgerError::Unauthorized)
        }
    }

    fn role_set(&self, role: Role) -> &HashSet<PrincipalId> {
        match role {
            Role::Admin => &self.admins,
            Role::Upgrader => &self.upgraders,
        }
    }

    fn role_set_mut(&mut self, role: Role) -> &mut HashSet<PrincipalId> {
        match role {
            Role::Admin => &mut self.admins,
            Role::Upgrader => &mut self.upgraders,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate_with_owner(owner: PrincipalId) -> AccessGate {
        let mut gate = AccessGate::new();
        gate.bootstrap(owner);
        gate
    }

    #[test]
    fn bootstrap_designates_owner_with_admin_and_upgrader() {
        let owner = PrincipalId::new();
        let gate = gate_with_owner(owner);

        assert!(gate.is_owner(owner));
        assert!(gate.has_role(Role::Admin, owner));
        assert!(gate.has_role(Role::Upgrader, owner));
    }

    #[test]
    fn grant_requires_role_admin_capability() {
        let owner = PrincipalId::new();
        let stranger = PrincipalId::new();
        let target = PrincipalId::new();
        let mut gate = gate_with_owner(owner);

        let err = gate.grant_role(stranger, Role::Admin, target).unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized);
        assert!(!gate.has_role(Role::Admin, target));

        gate.grant_role(owner, Role::Admin, target).unwrap();
        assert!(gate.has_role(Role::Admin, target));

        // A granted admin can administer roles in turn.
        let third = PrincipalId::new();
        gate.grant_role(target, Role::Upgrader, third).unwrap();
        assert!(gate.has_role(Role::Upgrader, third));

        gate.revoke_role(owner, Role::Upgrader, third).unwrap();
        assert!(!gate.has_role(Role::Upgrader, third));
    }

    #[test]
    fn manager_grants_are_scoped_per_group() {
        let owner = PrincipalId::new();
        let manager = PrincipalId::new();
        let mut gate = gate_with_owner(owner);

        let g1 = GroupId::new(1);
        let g2 = GroupId::new(2);
        gate.grant_manager(g1, manager);
        gate.grant_manager(g2, manager);

        gate.revoke_manager(g1, manager);
        assert!(!gate.is_group_manager(g1, manager));
        assert!(gate.is_group_manager(g2, manager));
    }

    #[test]
    fn ownership_transfer_is_all_or_nothing() {
        let old = PrincipalId::new();
        let new = PrincipalId::new();
        let mut gate = gate_with_owner(old);

        gate.transfer_ownership(old, new).unwrap();

        assert!(gate.is_owner(new));
        assert!(!gate.is_owner(old));
        assert!(gate.has_role(Role::Admin, new));
        assert!(gate.has_role(Role::Upgrader, new));
        assert!(!gate.has_role(Role::Admin, old));
        assert!(!gate.has_role(Role::Upgrader, old));
    }

    #[test]
    fn ownership_transfer_to_self_is_rejected() {
        let owner = PrincipalId::new();
        let mut gate = gate_with_owner(owner);

        let before = gate.clone();
        let err = gate.transfer_ownership(owner, owner).unwrap_err();
        assert!(matches!(err, LedgerError::InvalidPrincipal(_)));
        assert_eq!(gate, before);
    }

    #[test]
    fn non_owner_cannot_transfer_ownership() {
        let owner = PrincipalId::new();
        let stranger = PrincipalId::new();
        let mut gate = gate_with_owner(owner);

        let err = gate.transfer_ownership(stranger, PrincipalId::new()).unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized);
        assert!(gate.is_owner(owner));
    }
}
