//! Available-funding deposits.

use chrono::{DateTime, Utc};

use lendpool_auth::AccessGate;
use lendpool_core::{GroupId, LedgerError, LedgerResult, PrincipalId};

use crate::asset::AssetLedger;
use crate::event::{GroupEvent, GroupFunded};
use crate::registry::GroupRegistry;

/// Confirm a deposit into a group's available funding. Owner-only.
///
/// This books custody already transferred out of band: it checks that the
/// collaborator custodies at least `amount` of the group's asset and credits
/// the counter. No asset movement is initiated here.
pub fn fund_group<A: AssetLedger + ?Sized>(
    gate: &AccessGate,
    registry: &mut GroupRegistry,
    assets: &A,
    caller: PrincipalId,
    group_id: GroupId,
    amount: u128,
    occurred_at: DateTime<Utc>,
) -> LedgerResult<GroupEvent> {
    gate.ensure_owner(caller)?;

    let group = registry.get_mut(group_id)?;
    group.ensure_open()?;

    let custodied = assets.custodied_balance(group.asset_id());
    if custodied < amount {
        return Err(LedgerError::InsufficientCustody {
            required: amount,
            custodied,
        });
    }

    group.credit_funding(amount)?;

    Ok(GroupEvent::GroupFunded(GroupFunded {
        group_id,
        funder: caller,
        amount,
        occurred_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::InMemoryAssetLedger;
    use lendpool_core::AssetId;

    fn fixture() -> (AccessGate, GroupRegistry, InMemoryAssetLedger, PrincipalId, GroupId, AssetId)
    {
        let owner = PrincipalId::new();
        let mut gate = AccessGate::new();
        gate.bootstrap(owner);
        let mut registry = GroupRegistry::new();
        let asset = AssetId::new();
        let (group_id, _) = registry
            .create_group(&mut gate, owner, PrincipalId::new(), asset, Utc::now())
            .unwrap();
        (gate, registry, InMemoryAssetLedger::new(), owner, group_id, asset)
    }

    #[test]
    fn funding_credits_the_counter_when_custody_covers_it() {
        let (gate, mut registry, assets, owner, group_id, asset) = fixture();
        assets.credit_custody(asset, 1_000);

        let event =
            fund_group(&gate, &mut registry, &assets, owner, group_id, 1_000, Utc::now()).unwrap();
        assert_eq!(registry.get(group_id).unwrap().available_funding(), 1_000);
        assert!(matches!(event, GroupEvent::GroupFunded(ref e) if e.amount == 1_000));
    }

    #[test]
    fn funding_beyond_custody_is_rejected() {
        let (gate, mut registry, assets, owner, group_id, asset) = fixture();
        assets.credit_custody(asset, 999);

        let err = fund_group(&gate, &mut registry, &assets, owner, group_id, 1_000, Utc::now())
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientCustody {
                required: 1_000,
                custodied: 999
            }
        );
        assert_eq!(registry.get(group_id).unwrap().available_funding(), 0);
    }

    #[test]
    fn only_owner_funds() {
        let (gate, mut registry, assets, _owner, group_id, asset) = fixture();
        assets.credit_custody(asset, 1_000);

        let err = fund_group(
            &gate,
            &mut registry,
            &assets,
            PrincipalId::new(),
            group_id,
            100,
            Utc::now(),
        )
        .unwrap_err();
        assert_eq!(err, LedgerError::Unauthorized);
    }

    #[test]
    fn closed_groups_cannot_be_funded() {
        let (gate, mut registry, assets, owner, group_id, asset) = fixture();
        assets.credit_custody(asset, 1_000);
        registry.close_group(&gate, owner, group_id, Utc::now()).unwrap();

        let err = fund_group(&gate, &mut registry, &assets, owner, group_id, 100, Utc::now())
            .unwrap_err();
        assert_eq!(err, LedgerError::GroupClosed(group_id));
    }
}
