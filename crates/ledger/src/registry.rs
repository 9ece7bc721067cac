//! Group collection: id allocation, lifecycle, and reads.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use lendpool_auth::AccessGate;
use lendpool_core::{AssetId, GroupId, LedgerError, LedgerResult, PrincipalId};

use crate::event::{GroupClosed, GroupCreated, GroupEvent};
use crate::group::Group;

/// Owns every [`Group`] record and allocates group identifiers.
///
/// Ids are handed out sequentially starting at 1 and are never reused, even
/// after a group closes. Also keeps the user→last-group convenience index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRegistry {
    next_id: u64,
    groups: BTreeMap<GroupId, Group>,
    /// Last group each principal was added to. A convenience lookup, not an
    /// ownership relation: removal does not clear it, so entries can go stale.
    user_group_index: HashMap<PrincipalId, GroupId>,
}

impl Default for GroupRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            groups: BTreeMap::new(),
            user_group_index: HashMap::new(),
        }
    }

    /// Register a new open group. Owner-only.
    ///
    /// The manager is the sole initial member, receives the manager grant
    /// scoped to the new id, and is recorded in the user-group index.
    pub fn create_group(
        &mut self,
        gate: &mut AccessGate,
        caller: PrincipalId,
        manager: PrincipalId,
        asset_id: AssetId,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<(GroupId, GroupEvent)> {
        gate.ensure_owner(caller)?;

        let id = GroupId::new(self.next_id);
        self.next_id += 1;

        self.groups.insert(id, Group::open(id, manager, asset_id));
        gate.grant_manager(id, manager);
        self.user_group_index.insert(manager, id);

        let event = GroupEvent::GroupCreated(GroupCreated {
            group_id: id,
            manager,
            asset_id,
            occurred_at,
        });
        Ok((id, event))
    }

    /// Close a group. Owner-only, irreversible.
    pub fn close_group(
        &mut self,
        gate: &AccessGate,
        caller: PrincipalId,
        id: GroupId,
        occurred_at: DateTime<Utc>,
    ) -> LedgerResult<GroupEvent> {
        gate.ensure_owner(caller)?;

        let group = self.get_mut(id)?;
        if !group.is_open() {
            return Err(LedgerError::GroupAlreadyClosed(id));
        }
        group.close();

        Ok(GroupEvent::GroupClosed(GroupClosed {
            group_id: id,
            occurred_at,
        }))
    }

    /// Read a group. No authorization required.
    pub fn get(&self, id: GroupId) -> LedgerResult<&Group> {
        self.groups.get(&id).ok_or(LedgerError::UnknownGroup(id))
    }

    pub(crate) fn get_mut(&mut self, id: GroupId) -> LedgerResult<&mut Group> {
        self.groups.get_mut(&id).ok_or(LedgerError::UnknownGroup(id))
    }

    /// Read the member at `index` in a group's member sequence.
    pub fn member_at(&self, id: GroupId, index: usize) -> LedgerResult<PrincipalId> {
        let group = self.get(id)?;
        group.member_at(index).ok_or(LedgerError::OutOfRange {
            index,
            len: group.member_count(),
        })
    }

    /// Last group a principal was added to, if any was recorded.
    pub fn last_group_of(&self, principal: PrincipalId) -> Option<GroupId> {
        self.user_group_index.get(&principal).copied()
    }

    pub(crate) fn record_user_group(&mut self, principal: PrincipalId, id: GroupId) {
        self.user_group_index.insert(principal, id);
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }
}
