use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use lendpool_core::{AssetId, GroupId, LedgerError, LedgerResult, PrincipalId};

/// One loan's history: the amount issued and the cumulative repayments.
///
/// Records are append-only; their position in a member's sequence is the
/// loan's stable local identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    requested_amount: u128,
    repaid_amount: u128,
}

impl LoanRecord {
    fn issue(requested_amount: u128) -> Self {
        Self {
            requested_amount,
            repaid_amount: 0,
        }
    }

    /// Amount issued when the loan was created. Never changes.
    pub fn requested_amount(&self) -> u128 {
        self.requested_amount
    }

    /// Cumulative repayments. Monotonically non-decreasing; not bounded by
    /// `requested_amount`.
    pub fn repaid_amount(&self) -> u128 {
        self.repaid_amount
    }
}

/// A lending pool: one manager, a member set, a custodial funding balance
/// denominated in one external asset, and per-member loan history.
///
/// Fields are private; each owning module mutates its slice of the record
/// through the narrow methods below. Groups are never destroyed, only closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    id: GroupId,
    manager: PrincipalId,
    asset_id: AssetId,
    is_open: bool,
    available_funding: u128,
    /// Insertion order is kept so index-based member reads are stable.
    members: Vec<PrincipalId>,
    loan_records: HashMap<PrincipalId, Vec<LoanRecord>>,
    /// Kept in lockstep with the record vector lengths.
    loan_counts: HashMap<PrincipalId, u64>,
}

impl Group {
    /// A new open group with zero funding whose sole member is its manager.
    pub(crate) fn open(id: GroupId, manager: PrincipalId, asset_id: AssetId) -> Self {
        Self {
            id,
            manager,
            asset_id,
            is_open: true,
            available_funding: 0,
            members: vec![manager],
            loan_records: HashMap::new(),
            loan_counts: HashMap::new(),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn manager(&self) -> PrincipalId {
        self.manager
    }

    pub fn asset_id(&self) -> AssetId {
        self.asset_id
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn available_funding(&self) -> u128 {
        self.available_funding
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn member_at(&self, index: usize) -> Option<PrincipalId> {
        self.members.get(index).copied()
    }

    pub fn is_member(&self, principal: PrincipalId) -> bool {
        self.members.contains(&principal)
    }

    pub fn loan_count(&self, member: PrincipalId) -> u64 {
        self.loan_counts.get(&member).copied().unwrap_or(0)
    }

    pub fn loan(&self, member: PrincipalId, index: u64) -> Option<&LoanRecord> {
        self.loan_records.get(&member)?.get(index as usize)
    }

    /// Errors with `GroupClosed` unless the group is open.
    pub fn ensure_open(&self) -> LedgerResult<()> {
        if self.is_open {
            Ok(())
        } else {
            Err(LedgerError::GroupClosed(self.id))
        }
    }

    // ── lifecycle (registry) ────────────────────────────────────────────────

    /// True→false exactly once; there is no reopen.
    pub(crate) fn close(&mut self) {
        self.is_open = false;
    }

    // ── membership ──────────────────────────────────────────────────────────

    /// Set semantics: returns whether the member set changed.
    pub(crate) fn insert_member(&mut self, principal: PrincipalId) -> bool {
        if self.members.contains(&principal) {
            false
        } else {
            self.members.push(principal);
            true
        }
    }

    /// Set semantics: removing an absent principal is a no-op (returns false).
    pub(crate) fn remove_member(&mut self, principal: PrincipalId) -> bool {
        match self.members.iter().position(|m| *m == principal) {
            Some(pos) => {
                self.members.remove(pos);
                true
            }
            None => false,
        }
    }

    // ── funding ─────────────────────────────────────────────────────────────

    pub(crate) fn credit_funding(&mut self, amount: u128) -> LedgerResult<()> {
        self.available_funding = self
            .available_funding
            .checked_add(amount)
            .ok_or_else(|| LedgerError::validation("available funding overflow"))?;
        Ok(())
    }

    // ── loans ───────────────────────────────────────────────────────────────

    /// Issue a loan: append the record at the member's next index, bump the
    /// count, and consume funding. Checks `ExceedsAvailableFunding` before
    /// touching anything; on success the whole effect set is applied.
    pub(crate) fn apply_loan_issue(
        &mut self,
        member: PrincipalId,
        amount: u128,
    ) -> LedgerResult<u64> {
        if amount > self.available_funding {
            return Err(LedgerError::ExceedsAvailableFunding {
                requested: amount,
                available: self.available_funding,
            });
        }

        let records = self.loan_records.entry(member).or_default();
        let index = records.len() as u64;
        records.push(LoanRecord::issue(amount));
        *self.loan_counts.entry(member).or_insert(0) += 1;
        self.available_funding -= amount;
        Ok(index)
    }

    /// Undo the most recent [`apply_loan_issue`] for `member` after the
    /// external transfer failed. Restores the record sequence, the count,
    /// and the funding it consumed. Map entries the issue created for a
    /// member's first loan are removed again, so the rollback leaves the
    /// group structurally identical to its pre-issue state.
    ///
    /// [`apply_loan_issue`]: Group::apply_loan_issue
    pub(crate) fn revert_loan_issue(&mut self, member: PrincipalId, amount: u128) {
        let records_drained = match self.loan_records.get_mut(&member) {
            Some(records) => {
                records.pop();
                records.is_empty()
            }
            None => false,
        };
        if records_drained {
            self.loan_records.remove(&member);
        }

        let count_drained = match self.loan_counts.get_mut(&member) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count == 0
            }
            None => false,
        };
        if count_drained {
            self.loan_counts.remove(&member);
        }

        // Cannot overflow: the issue just subtracted this amount.
        self.available_funding = self.available_funding.saturating_add(amount);
    }

    /// Record a repayment: bump the record's cumulative repaid amount and
    /// return the repaid asset to available funding. Both additions are
    /// validated before either is applied, so failure leaves no partial
    /// state. `repaid_amount` is not capped at `requested_amount`.
    pub(crate) fn apply_repayment(
        &mut self,
        member: PrincipalId,
        index: u64,
        amount: u128,
    ) -> LedgerResult<()> {
        let count = self.loan_count(member);
        let record = self
            .loan_records
            .get_mut(&member)
            .and_then(|records| records.get_mut(index as usize))
            .ok_or(LedgerError::InvalidLoanIndex { index, count })?;

        let new_repaid = record
            .repaid_amount
            .checked_add(amount)
            .ok_or_else(|| LedgerError::validation("repaid amount overflow"))?;
        let new_funding = self
            .available_funding
            .checked_add(amount)
            .ok_or_else(|| LedgerError::validation("available funding overflow"))?;

        record.repaid_amount = new_repaid;
        self.available_funding = new_funding;
        Ok(())
    }

    /// Undo an [`apply_repayment`] after the external pull failed.
    ///
    /// [`apply_repayment`]: Group::apply_repayment
    pub(crate) fn revert_repayment(&mut self, member: PrincipalId, index: u64, amount: u128) {
        if let Some(record) = self
            .loan_records
            .get_mut(&member)
            .and_then(|records| records.get_mut(index as usize))
        {
            record.repaid_amount = record.repaid_amount.saturating_sub(amount);
        }
        self.available_funding = self.available_funding.saturating_sub(amount);
    }

    // ── assignment ──────────────────────────────────────────────────────────

    pub(crate) fn set_manager(&mut self, manager: PrincipalId) {
        self.manager = manager;
    }
}

/// Serializable snapshot of a group for read operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupView {
    pub group_id: GroupId,
    pub manager: PrincipalId,
    pub asset_id: AssetId,
    pub is_open: bool,
    pub available_funding: u128,
    pub member_count: usize,
}

impl From<&Group> for GroupView {
    fn from(group: &Group) -> Self {
        Self {
            group_id: group.id(),
            manager: group.manager(),
            asset_id: group.asset_id(),
            is_open: group.is_open(),
            available_funding: group.available_funding(),
            member_count: group.member_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_group() -> Group {
        Group::open(GroupId::new(1), PrincipalId::new(), AssetId::new())
    }

    #[test]
    fn new_group_contains_its_manager() {
        let group = test_group();
        assert!(group.is_open());
        assert_eq!(group.available_funding(), 0);
        assert_eq!(group.member_count(), 1);
        assert!(group.is_member(group.manager()));
        assert_eq!(group.member_at(0), Some(group.manager()));
    }

    #[test]
    fn member_set_semantics_are_idempotent() {
        let mut group = test_group();
        let member = PrincipalId::new();

        assert!(group.insert_member(member));
        assert!(!group.insert_member(member));
        assert_eq!(group.member_count(), 2);

        assert!(group.remove_member(member));
        assert!(!group.remove_member(member));
        assert_eq!(group.member_count(), 1);
    }

    #[test]
    fn loan_issue_consumes_funding_and_counts_in_lockstep() {
        let mut group = test_group();
        let member = group.manager();
        group.credit_funding(1_000).unwrap();

        let first = group.apply_loan_issue(member, 400).unwrap();
        let second = group.apply_loan_issue(member, 100).unwrap();

        assert_eq!((first, second), (0, 1));
        assert_eq!(group.available_funding(), 500);
        assert_eq!(group.loan_count(member), 2);
        assert_eq!(group.loan(member, 0).unwrap().requested_amount(), 400);
        assert_eq!(group.loan(member, 0).unwrap().repaid_amount(), 0);
    }

    #[test]
    fn loan_issue_never_exceeds_funding() {
        let mut group = test_group();
        let member = group.manager();
        group.credit_funding(100).unwrap();

        let err = group.apply_loan_issue(member, 101).unwrap_err();
        assert_eq!(
            err,
            LedgerError::ExceedsAvailableFunding {
                requested: 101,
                available: 100
            }
        );
        assert_eq!(group.available_funding(), 100);
        assert_eq!(group.loan_count(member), 0);
    }

    #[test]
    fn revert_loan_issue_restores_all_staged_state() {
        let mut group = test_group();
        let member = group.manager();
        group.credit_funding(1_000).unwrap();

        let before = group.clone();
        group.apply_loan_issue(member, 250).unwrap();
        group.revert_loan_issue(member, 250);
        assert_eq!(group, before);
    }

    #[test]
    fn revert_of_a_repeat_loan_keeps_the_earlier_record() {
        let mut group = test_group();
        let member = group.manager();
        group.credit_funding(1_000).unwrap();
        group.apply_loan_issue(member, 400).unwrap();

        let before = group.clone();
        group.apply_loan_issue(member, 250).unwrap();
        group.revert_loan_issue(member, 250);

        assert_eq!(group, before);
        assert_eq!(group.loan_count(member), 1);
        assert_eq!(group.loan(member, 0).unwrap().requested_amount(), 400);
    }

    #[test]
    fn repayment_may_exceed_requested_amount() {
        let mut group = test_group();
        let member = group.manager();
        group.credit_funding(500).unwrap();
        group.apply_loan_issue(member, 200).unwrap();

        group.apply_repayment(member, 0, 350).unwrap();
        let record = group.loan(member, 0).unwrap();
        assert_eq!(record.requested_amount(), 200);
        assert_eq!(record.repaid_amount(), 350);
        assert_eq!(group.available_funding(), 650);
    }

    #[test]
    fn repayment_against_bad_index_is_rejected() {
        let mut group = test_group();
        let member = group.manager();
        group.credit_funding(500).unwrap();
        group.apply_loan_issue(member, 200).unwrap();

        let err = group.apply_repayment(member, 1, 10).unwrap_err();
        assert_eq!(err, LedgerError::InvalidLoanIndex { index: 1, count: 1 });

        let stranger = PrincipalId::new();
        let err = group.apply_repayment(stranger, 0, 10).unwrap_err();
        assert_eq!(err, LedgerError::InvalidLoanIndex { index: 0, count: 0 });
    }
}
