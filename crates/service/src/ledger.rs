use chrono::Utc;

use lendpool_auth::{AccessGate, Role};
use lendpool_core::{AssetId, GroupId, LedgerError, LedgerResult, PrincipalId};
use lendpool_events::{Event, EventLog, LoggedEvent};
use lendpool_ledger::{
    assignment, funding, loans, membership, AssetLedger, GroupEvent, GroupRegistry, GroupView,
    LoanRecord,
};

/// The pooled-lending ledger.
///
/// Every public operation is one transaction: it either commits its entire
/// effect set — state mutation plus exactly one appended event — or fails
/// with no visible change. Mutating operations take `&mut self`, so access is
/// serialized per instance by the borrow checker; embedders that share a
/// ledger across tasks put it behind their own mutex (one writer per
/// instance).
#[derive(Debug)]
pub struct LendingLedger<A: AssetLedger> {
    assets: A,
    initialized: bool,
    gate: AccessGate,
    registry: GroupRegistry,
    log: EventLog<GroupEvent>,
}

impl<A: AssetLedger> LendingLedger<A> {
    /// An empty, un-bootstrapped ledger. Nothing but [`initialize`] succeeds
    /// against it (no owner is designated yet).
    ///
    /// [`initialize`]: LendingLedger::initialize
    pub fn new(assets: A) -> Self {
        Self {
            assets,
            initialized: false,
            gate: AccessGate::new(),
            registry: GroupRegistry::new(),
            log: EventLog::new(),
        }
    }

    /// One-time setup: designates the calling principal as owner (with the
    /// admin and upgrader capabilities) and seeds the group-id counter at 1.
    pub fn initialize(&mut self, caller: PrincipalId) -> LedgerResult<()> {
        if self.initialized {
            return Err(LedgerError::AlreadyInitialized);
        }
        self.gate.bootstrap(caller);
        self.initialized = true;
        tracing::info!(owner = %caller, "lending ledger initialized");
        Ok(())
    }

    // ── groups ──────────────────────────────────────────────────────────────

    pub fn create_group(
        &mut self,
        caller: PrincipalId,
        manager: PrincipalId,
        asset_id: AssetId,
    ) -> LedgerResult<GroupId> {
        let (id, event) =
            self.registry
                .create_group(&mut self.gate, caller, manager, asset_id, Utc::now())?;
        self.record(event);
        Ok(id)
    }

    pub fn close_group(&mut self, caller: PrincipalId, group_id: GroupId) -> LedgerResult<()> {
        let event = self
            .registry
            .close_group(&self.gate, caller, group_id, Utc::now())?;
        self.record(event);
        Ok(())
    }

    pub fn get_group(&self, group_id: GroupId) -> LedgerResult<GroupView> {
        Ok(GroupView::from(self.registry.get(group_id)?))
    }

    pub fn get_group_member(
        &self,
        group_id: GroupId,
        index: usize,
    ) -> LedgerResult<PrincipalId> {
        self.registry.member_at(group_id, index)
    }

    // ── membership ──────────────────────────────────────────────────────────

    pub fn add_member(
        &mut self,
        caller: PrincipalId,
        group_id: GroupId,
        member: PrincipalId,
    ) -> LedgerResult<()> {
        let event = membership::add_member(
            &self.gate,
            &mut self.registry,
            caller,
            group_id,
            member,
            Utc::now(),
        )?;
        self.record(event);
        Ok(())
    }

    pub fn remove_member(
        &mut self,
        caller: PrincipalId,
        group_id: GroupId,
        member: PrincipalId,
    ) -> LedgerResult<()> {
        let event = membership::remove_member(
            &self.gate,
            &mut self.registry,
            caller,
            group_id,
            member,
            Utc::now(),
        )?;
        self.record(event);
        Ok(())
    }

    pub fn add_members(
        &mut self,
        caller: PrincipalId,
        group_id: GroupId,
        members: Vec<PrincipalId>,
    ) -> LedgerResult<()> {
        let event = membership::add_members(
            &self.gate,
            &mut self.registry,
            caller,
            group_id,
            members,
            Utc::now(),
        )?;
        self.record(event);
        Ok(())
    }

    pub fn remove_members(
        &mut self,
        caller: PrincipalId,
        group_id: GroupId,
        members: Vec<PrincipalId>,
    ) -> LedgerResult<()> {
        let event = membership::remove_members(
            &self.gate,
            &mut self.registry,
            caller,
            group_id,
            members,
            Utc::now(),
        )?;
        self.record(event);
        Ok(())
    }

    // ── funding & loans ─────────────────────────────────────────────────────

    pub fn fund_group(
        &mut self,
        caller: PrincipalId,
        group_id: GroupId,
        amount: u128,
    ) -> LedgerResult<()> {
        let event = funding::fund_group(
            &self.gate,
            &mut self.registry,
            &self.assets,
            caller,
            group_id,
            amount,
            Utc::now(),
        )?;
        self.record(event);
        Ok(())
    }

    /// Issue a loan to the caller. Returns the loan's index in the caller's
    /// record sequence.
    pub fn request_loan(
        &mut self,
        caller: PrincipalId,
        group_id: GroupId,
        amount: u128,
    ) -> LedgerResult<u64> {
        let (loan_index, event) = loans::request_loan(
            &self.gate,
            &mut self.registry,
            &self.assets,
            caller,
            group_id,
            amount,
            Utc::now(),
        )?;
        self.record(event);
        Ok(loan_index)
    }

    pub fn repay_loan(
        &mut self,
        caller: PrincipalId,
        group_id: GroupId,
        loan_index: u64,
        amount: u128,
    ) -> LedgerResult<()> {
        let event = loans::repay_loan(
            &mut self.registry,
            &self.assets,
            caller,
            group_id,
            loan_index,
            amount,
            Utc::now(),
        )?;
        self.record(event);
        Ok(())
    }

    pub fn member_loan_count(
        &self,
        group_id: GroupId,
        member: PrincipalId,
    ) -> LedgerResult<u64> {
        loans::member_loan_count(&self.registry, group_id, member)
    }

    pub fn member_loan(
        &self,
        group_id: GroupId,
        member: PrincipalId,
        loan_index: u64,
    ) -> LedgerResult<LoanRecord> {
        loans::member_loan(&self.registry, group_id, member, loan_index)
    }

    // ── management & roles ──────────────────────────────────────────────────

    pub fn change_manager(
        &mut self,
        caller: PrincipalId,
        group_id: GroupId,
        new_manager: PrincipalId,
    ) -> LedgerResult<()> {
        let event = assignment::change_manager(
            &mut self.gate,
            &mut self.registry,
            caller,
            group_id,
            new_manager,
            Utc::now(),
        )?;
        self.record(event);
        Ok(())
    }

    /// Owner-only direct custodial transfer out — an escape hatch that moves
    /// asset independent of any group's funding accounting. Never touches
    /// `available_funding` and reports no domain event.
    pub fn send_asset(
        &mut self,
        caller: PrincipalId,
        asset_id: AssetId,
        to: PrincipalId,
        amount: u128,
    ) -> LedgerResult<()> {
        self.gate.ensure_owner(caller)?;
        self.assets
            .transfer_out(asset_id, to, amount)
            .map_err(|e| LedgerError::transfer_failed(e.to_string()))?;
        tracing::info!(%asset_id, %to, amount, "custodial asset sent");
        Ok(())
    }

    pub fn grant_admin_role(
        &mut self,
        caller: PrincipalId,
        principal: PrincipalId,
    ) -> LedgerResult<()> {
        self.gate.grant_role(caller, Role::Admin, principal)
    }

    pub fn grant_upgrader_role(
        &mut self,
        caller: PrincipalId,
        principal: PrincipalId,
    ) -> LedgerResult<()> {
        self.gate.grant_role(caller, Role::Upgrader, principal)
    }

    pub fn revoke_admin_role(
        &mut self,
        caller: PrincipalId,
        principal: PrincipalId,
    ) -> LedgerResult<()> {
        self.gate.revoke_role(caller, Role::Admin, principal)
    }

    pub fn revoke_upgrader_role(
        &mut self,
        caller: PrincipalId,
        principal: PrincipalId,
    ) -> LedgerResult<()> {
        self.gate.revoke_role(caller, Role::Upgrader, principal)
    }

    pub fn transfer_ownership(
        &mut self,
        caller: PrincipalId,
        new_owner: PrincipalId,
    ) -> LedgerResult<()> {
        self.gate.transfer_ownership(caller, new_owner)?;
        tracing::info!(%new_owner, "ownership transferred");
        Ok(())
    }

    pub fn has_role(&self, role: Role, principal: PrincipalId) -> bool {
        self.gate.has_role(role, principal)
    }

    // ── observation ─────────────────────────────────────────────────────────

    /// The append-only event log: one entry per successful state change.
    pub fn events(&self) -> &[LoggedEvent<GroupEvent>] {
        self.log.entries()
    }

    pub fn assets(&self) -> &A {
        &self.assets
    }

    fn record(&mut self, event: GroupEvent) {
        let sequence = self.log.append(event.clone());
        tracing::info!(event_type = event.event_type(), sequence, "ledger event");
    }
}
