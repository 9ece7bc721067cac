//! Loan issuance and repayment.
//!
//! Both mutations follow the same discipline: run every check, commit the
//! internal state, then invoke the external transfer, and unwind the staged
//! state if the collaborator fails. Nothing outside the operation can observe
//! the staged-but-unconfirmed state — the group record is only reachable
//! through the `&mut` borrow the operation holds.

use chrono::{DateTime, Utc};

use lendpool_auth::AccessGate;
use lendpool_core::{GroupId, LedgerError, LedgerResult, PrincipalId};

use crate::asset::AssetLedger;
use crate::event::{GroupEvent, LoanRepaid, LoanRequested};
use crate::group::LoanRecord;
use crate::registry::GroupRegistry;

/// Issue a loan to the caller out of the group's available funding.
///
/// Gating is owner-AND-member: the caller must be the owner and must be a
/// member of the group (the original system's gating, kept deliberately —
/// see DESIGN.md). Returns the loan's index in the caller's record sequence,
/// which is the caller's record count before the call.
pub fn request_loan<A: AssetLedger + ?Sized>(
    gate: &AccessGate,
    registry: &mut GroupRegistry,
    assets: &A,
    caller: PrincipalId,
    group_id: GroupId,
    amount: u128,
    occurred_at: DateTime<Utc>,
) -> LedgerResult<(u64, GroupEvent)> {
    gate.ensure_owner(caller)?;

    let group = registry.get_mut(group_id)?;
    group.ensure_open()?;
    if !group.is_member(caller) {
        return Err(LedgerError::Unauthorized);
    }
    if amount == 0 {
        return Err(LedgerError::validation("loan amount must be positive"));
    }

    let asset_id = group.asset_id();
    let loan_index = group.apply_loan_issue(caller, amount)?;

    if let Err(err) = assets.transfer_out(asset_id, caller, amount) {
        group.revert_loan_issue(caller, amount);
        return Err(LedgerError::transfer_failed(err.to_string()));
    }

    let event = GroupEvent::LoanRequested(LoanRequested {
        group_id,
        member: caller,
        loan_index,
        amount,
        occurred_at,
    });
    Ok((loan_index, event))
}

/// Repay against one of the caller's loan records.
///
/// The repaid amount is pulled from the caller into custody and returned to
/// the group's available funding. Cumulative repayment is not capped at the
/// requested amount.
pub fn repay_loan<A: AssetLedger + ?Sized>(
    registry: &mut GroupRegistry,
    assets: &A,
    caller: PrincipalId,
    group_id: GroupId,
    loan_index: u64,
    amount: u128,
    occurred_at: DateTime<Utc>,
) -> LedgerResult<GroupEvent> {
    let group = registry.get_mut(group_id)?;
    group.ensure_open()?;
    if !group.is_member(caller) {
        return Err(LedgerError::Unauthorized);
    }

    let asset_id = group.asset_id();
    group.apply_repayment(caller, loan_index, amount)?;

    if let Err(err) = assets.transfer_in(asset_id, caller, amount) {
        group.revert_repayment(caller, loan_index, amount);
        return Err(LedgerError::transfer_failed(err.to_string()));
    }

    Ok(GroupEvent::LoanRepaid(LoanRepaid {
        group_id,
        member: caller,
        loan_index,
        amount,
        occurred_at,
    }))
}

/// Number of loan records held by `member` in the group. Zero for principals
/// with no history. No authorization required.
pub fn member_loan_count(
    registry: &GroupRegistry,
    group_id: GroupId,
    member: PrincipalId,
) -> LedgerResult<u64> {
    Ok(registry.get(group_id)?.loan_count(member))
}

/// Read one of a member's loan records. No authorization required.
pub fn member_loan(
    registry: &GroupRegistry,
    group_id: GroupId,
    member: PrincipalId,
    loan_index: u64,
) -> LedgerResult<LoanRecord> {
    let group = registry.get(group_id)?;
    group
        .loan(member, loan_index)
        .copied()
        .ok_or(LedgerError::InvalidLoanIndex {
            index: loan_index,
            count: group.loan_count(member),
        })
}
